use super::properties::{read_property_csv, PropertyBook};
use super::storms::{read_storm_csv, StormRecord};
use crate::config::DataConfig;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Both tables, loaded together and held for the lifetime of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub storms: Vec<StormRecord>,
    pub properties: PropertyBook,
}

impl Datasets {
    pub fn from_readers<S: Read, P: Read>(
        storms: S,
        properties: P,
    ) -> Result<Self, DataSourceError> {
        Self::read_tables((storms, None), (properties, None))
    }

    /// Parses both tables; `path` only labels errors.
    fn read_tables<S: Read, P: Read>(
        (storms, storm_path): (S, Option<&Path>),
        (properties, property_path): (P, Option<&Path>),
    ) -> Result<Self, DataSourceError> {
        let storms = read_storm_csv(storms).map_err(|source| DataSourceError::Csv {
            table: Table::Storms,
            path: storm_path.map(Path::to_path_buf),
            source,
        })?;
        let properties = read_property_csv(properties).map_err(|source| DataSourceError::Csv {
            table: Table::Properties,
            path: property_path.map(Path::to_path_buf),
            source,
        })?;
        Ok(Self { storms, properties })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Storms,
    Properties,
}

impl Table {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Storms => "storm",
            Self::Properties => "property",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("failed to open {} data at {}: {source}", .table.label(), .path.display())]
    Io {
        table: Table,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {} CSV data{}: {source}", .table.label(), describe_path(.path.as_deref()))]
    Csv {
        table: Table,
        path: Option<PathBuf>,
        #[source]
        source: csv::Error,
    },
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|path| format!(" in {}", path.display()))
        .unwrap_or_default()
}

/// Supplies both tables at once or fails without partial data.
pub trait DataSource: Send + Sync {
    fn load(&self) -> Result<Datasets, DataSourceError>;
}

#[derive(Debug, Clone)]
pub struct CsvDataSource {
    storm_path: PathBuf,
    property_path: PathBuf,
}

impl CsvDataSource {
    pub fn new(storm_path: impl Into<PathBuf>, property_path: impl Into<PathBuf>) -> Self {
        Self {
            storm_path: storm_path.into(),
            property_path: property_path.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.storm_path.clone(), config.property_path.clone())
    }

    fn open(table: Table, path: &Path) -> Result<File, DataSourceError> {
        File::open(path).map_err(|source| DataSourceError::Io {
            table,
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DataSource for CsvDataSource {
    fn load(&self) -> Result<Datasets, DataSourceError> {
        let storm_file = Self::open(Table::Storms, &self.storm_path)?;
        let property_file = Self::open(Table::Properties, &self.property_path)?;

        let datasets = Datasets::read_tables(
            (storm_file, Some(self.storm_path.as_path())),
            (property_file, Some(self.property_path.as_path())),
        )?;

        info!(
            storms = datasets.storms.len(),
            locations = datasets.properties.len(),
            policy_years = datasets.properties.record_count(),
            rejected = datasets.properties.rejected(),
            "exposure datasets loaded"
        );

        Ok(datasets)
    }
}

/// In-memory CSV text, used for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct InlineDataSource {
    pub storm_csv: String,
    pub property_csv: String,
}

impl DataSource for InlineDataSource {
    fn load(&self) -> Result<Datasets, DataSourceError> {
        Datasets::from_readers(self.storm_csv.as_bytes(), self.property_csv.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_surface_as_io_errors() {
        let source = CsvDataSource::new("./does-not-exist/storms.csv", "./nope.csv");
        let error = source.load().expect_err("expected io error");
        match error {
            DataSourceError::Io { table, ref path, .. } => {
                assert_eq!(table, Table::Storms);
                assert_eq!(path, Path::new("./does-not-exist/storms.csv"));
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_do_not_fail_the_load() {
        let source = InlineDataSource {
            storm_csv: "storm_name,latitude,longitude,wind_speed,year\n\
Alpha,20,-70,50,2001\n\
Rita,26.0,-81.0\n"
                .to_string(),
            property_csv: "Location,Latitude,Longitude,PolicyYear\n\
1,25.0,-80.0,2022\n\
2\n"
                .to_string(),
        };
        let datasets = source.load().expect("ragged rows tolerated");
        assert_eq!(datasets.storms.len(), 2);
        assert!(datasets.storms[1].wind_speed.is_nan());
        assert_eq!(datasets.properties.record_count(), 1);
        assert_eq!(datasets.properties.rejected(), 1);
    }

    #[test]
    fn undecodable_property_csv_fails_the_whole_load() {
        let storms = "storm_name,year\nAlpha,2001\n";
        let properties: &[u8] = b"Location,Latitude\n\xff\xfe,25.0\n";
        let error = Datasets::from_readers(storms.as_bytes(), properties)
            .expect_err("invalid utf-8 rejected");
        assert!(matches!(
            error,
            DataSourceError::Csv {
                table: Table::Properties,
                path: None,
                ..
            }
        ));
        assert!(error.to_string().starts_with("invalid property CSV data"));
    }

    #[test]
    fn csv_errors_from_files_name_the_file() {
        let dir = std::env::temp_dir().join(format!("storm-exposure-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let storm_path = dir.join("storms.csv");
        let property_path = dir.join("properties.csv");
        std::fs::write(&storm_path, "storm_name,year\nAlpha,2001\n").expect("write storms");
        std::fs::write(&property_path, b"Location,Latitude\n\xff\xfe,25.0\n")
            .expect("write properties");

        let error = CsvDataSource::new(&storm_path, &property_path)
            .load()
            .expect_err("invalid utf-8 rejected");
        std::fs::remove_dir_all(&dir).ok();

        assert!(error
            .to_string()
            .contains(&format!(" in {}", property_path.display())));
        match error {
            DataSourceError::Csv {
                table: Table::Properties,
                path: Some(ref path),
                ..
            } => assert_eq!(path, &property_path),
            other => panic!("expected property csv error, got {other:?}"),
        }
    }

    #[test]
    fn inline_source_loads_both_tables() {
        let source = InlineDataSource {
            storm_csv: "storm_name,latitude,longitude,year\nAlpha,20,-70,2001\n".to_string(),
            property_csv: "Location,Latitude,Longitude,PolicyYear\n1,25.0,-80.0,2022\n"
                .to_string(),
        };
        let datasets = source.load().expect("loads");
        assert_eq!(datasets.storms.len(), 1);
        assert_eq!(datasets.properties.record_count(), 1);
    }
}
