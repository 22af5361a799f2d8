use crate::infra::{cli_data_source, DataArgs};
use clap::Args;
use std::sync::Arc;
use storm_exposure::error::AppError;
use storm_exposure::exposure::dashboard::current_year;
use storm_exposure::exposure::views::storm_options;
use storm_exposure::exposure::{
    Dashboard, DataSource, Datasets, FilterParams, RenderFrame, RenderSink,
};

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Storm key as Name_Year, or "all"
    #[arg(long)]
    pub(crate) storm: Option<String>,
    /// Only storms from the last N years (0 disables the window)
    #[arg(long)]
    pub(crate) lookback_years: Option<String>,
    /// Location id, or "all"
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Premium adequacy: adequate or inadequate
    #[arg(long)]
    pub(crate) adequacy: Option<String>,
    /// PML tier: high, medium or low
    #[arg(long)]
    pub(crate) pml: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat_min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat_max: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lng_min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lng_max: Option<String>,
    /// Include storm trajectories in the summary
    #[arg(long)]
    pub(crate) trajectories: bool,
    /// List every matching policy year
    #[arg(long)]
    pub(crate) list_properties: bool,
    /// Override the year the lookback window counts back from
    #[arg(long)]
    pub(crate) current_year: Option<i32>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

impl FilterArgs {
    fn params(&self) -> FilterParams {
        FilterParams {
            storm: self.storm.clone(),
            lookback_years: self.lookback_years.clone(),
            location: self.location.clone(),
            adequacy: self.adequacy.clone(),
            pml: self.pml.clone(),
            lat_min: self.lat_min.clone(),
            lat_max: self.lat_max.clone(),
            lng_min: self.lng_min.clone(),
            lng_max: self.lng_max.clone(),
            trajectories: self.trajectories.then(|| "true".to_string()),
        }
    }
}

/// Collects a plain-text rendering of each committed frame.
#[derive(Debug)]
pub(crate) struct ConsoleSink {
    list_properties: bool,
    lines: Vec<String>,
}

impl ConsoleSink {
    pub(crate) fn new(list_properties: bool) -> Self {
        Self {
            list_properties,
            lines: Vec::new(),
        }
    }
}

impl RenderSink for ConsoleSink {
    fn render(&mut self, frame: &RenderFrame) {
        let summary = frame.summary;
        self.lines.clear();
        self.lines.push(format!("Exposure summary (revision {})", frame.revision));
        self.lines.push(format!(
            "- {} storm observations across {} storms",
            summary.storm_points, summary.storm_tracks
        ));
        self.lines.push(format!(
            "- {} policy years across {} locations",
            summary.properties, summary.locations
        ));

        if !frame.trajectories.is_empty() {
            self.lines.push("Trajectories:".to_string());
            for trajectory in &frame.trajectories {
                self.lines.push(format!(
                    "  - {} ({} points)",
                    trajectory.key,
                    trajectory.path.len()
                ));
            }
        }

        if !frame.breakdown.rows.is_empty() {
            self.lines.push("Observations by year:".to_string());
            for row in &frame.breakdown.rows {
                let categories: Vec<String> = row
                    .counts
                    .iter()
                    .filter(|entry| entry.count > 0)
                    .map(|entry| format!("{} {}", entry.label, entry.count))
                    .collect();
                self.lines.push(format!(
                    "  - {}: {} ({})",
                    row.year,
                    row.total(),
                    categories.join(", ")
                ));
            }
        }

        if self.list_properties {
            self.lines.push("Locations:".to_string());
            for marker in &frame.properties {
                let snapshot = &marker.snapshot;
                self.lines.push(format!(
                    "  - Location {} [{}]: TIV {} | premium {} | PML {} ({}) | {}",
                    marker.location_id,
                    snapshot
                        .policy_year
                        .map_or_else(|| "no year".to_string(), |year| year.to_string()),
                    snapshot.formatted.total_insured_value,
                    snapshot.formatted.premium,
                    snapshot.formatted.probable_max_loss,
                    snapshot.pml_tier_label,
                    snapshot.adequacy_label
                ));
            }
        }
    }
}

pub(crate) fn run_filter_report(args: FilterArgs) -> Result<(), AppError> {
    let source = cli_data_source(args.data.clone())?;
    let datasets = source.load()?;
    let lines = filter_report(datasets, &args);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn filter_report(datasets: Datasets, args: &FilterArgs) -> Vec<String> {
    let year = args.current_year.unwrap_or_else(current_year);
    let mut dashboard = Dashboard::new(Arc::new(datasets));
    let mut sink = ConsoleSink::new(args.list_properties);

    let outcome = dashboard.submit_at(args.params().into_selection(), year);
    dashboard.commit(&outcome, &mut sink);
    sink.lines
}

pub(crate) fn run_storm_listing(args: DataArgs) -> Result<(), AppError> {
    let source = cli_data_source(args)?;
    let datasets = source.load()?;
    for line in storm_listing(&datasets) {
        println!("{line}");
    }
    Ok(())
}

fn storm_listing(datasets: &Datasets) -> Vec<String> {
    storm_options(&datasets.storms)
        .into_iter()
        .map(|option| format!("{}\t{}", option.value, option.label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_exposure::exposure::InlineDataSource;

    fn datasets() -> Datasets {
        InlineDataSource {
            storm_csv: "storm_name,latitude,longitude,wind_speed,distance_to_land,year\n\
Sandy,32.0,-75.0,85,210,2012\n\
Sandy,39.4,-74.4,80,15,2012\n\
Ian,26.7,-82.2,135,5,2022\n"
                .to_string(),
            property_csv: "Location,Latitude,Longitude,Premium,Non-Catastrophy Loss,Estimated_Catastrophe_Loss,PolicyYear,PML\n\
1,25.7,-80.1,\"12,000\",\"3,000\",\"4,000\",2021,\"300,000\"\n\
2,29.9,-90.0,\"9,000\",\"8,000\",\"4,000\",2022,\"95,000\"\n"
                .to_string(),
        }
        .load()
        .expect("inline data loads")
    }

    #[test]
    fn filter_report_summarises_matching_frame() {
        let args = FilterArgs {
            storm: Some("Sandy_2012".to_string()),
            trajectories: true,
            list_properties: true,
            current_year: Some(2024),
            ..FilterArgs::default()
        };

        let lines = filter_report(datasets(), &args);
        assert_eq!(lines[0], "Exposure summary (revision 1)");
        assert_eq!(lines[1], "- 2 storm observations across 1 storms");
        assert!(lines.contains(&"  - Sandy_2012 (2 points)".to_string()));
        assert!(lines.contains(&"  - 2012: 2 (Category 1 2)".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("  - Location 2 [2022]") && line.ends_with("Inadequate")));
    }

    #[test]
    fn lookback_flag_narrows_storms() {
        let args = FilterArgs {
            lookback_years: Some("5".to_string()),
            current_year: Some(2024),
            ..FilterArgs::default()
        };
        let lines = filter_report(datasets(), &args);
        assert_eq!(lines[1], "- 1 storm observations across 1 storms");
        assert!(!lines.iter().any(|line| line == "Locations:"));
    }

    #[test]
    fn storm_listing_uses_name_year_keys() {
        assert_eq!(
            storm_listing(&datasets()),
            vec!["Sandy_2012\tSandy (2012)", "Ian_2022\tIan (2022)"]
        );
    }
}
