use crate::infra::DataArgs;
use crate::report::{run_filter_report, run_storm_listing, FilterArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use storm_exposure::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Storm Exposure Dashboard",
    about = "Serve and query the hurricane exposure dashboard from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Apply one filter selection and print a summary of the matching storms and policies
    Filter(FilterArgs),
    /// List every storm in the dataset as name_year keys
    Storms(DataArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Filter(args) => run_filter_report(args),
        Command::Storms(args) => run_storm_listing(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_parse() {
        let cli = Cli::try_parse_from([
            "storm-exposure-api",
            "filter",
            "--storm",
            "Katrina_2005",
            "--lookback-years",
            "10",
            "--lat-min",
            "25",
            "--trajectories",
        ])
        .expect("flags parse");

        match cli.command {
            Some(Command::Filter(args)) => {
                assert_eq!(args.storm.as_deref(), Some("Katrina_2005"));
                assert_eq!(args.lookback_years.as_deref(), Some("10"));
                assert_eq!(args.lat_min.as_deref(), Some("25"));
                assert!(args.trajectories);
            }
            other => panic!("expected filter command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["storm-exposure-api"]).expect("parses");
        assert!(cli.command.is_none());
    }
}
