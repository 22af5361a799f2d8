use super::classify::{NatureCode, StormCategory};
use super::numeric::{coerce_integer, coerce_number};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// Raw storm row as exported by the best-track spreadsheet. Missing columns read as blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StormRow {
    #[serde(default)]
    pub storm_name: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub wind_speed: String,
    #[serde(default)]
    pub distance_to_land: String,
    #[serde(default)]
    pub nature: String,
    #[serde(rename = "Impactful", default)]
    pub impactful: String,
    #[serde(default)]
    pub year: String,
}

/// Identity of one storm track. Names recur across seasons, so the year is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StormKey {
    pub name: String,
    pub year: Option<i32>,
}

impl StormKey {
    pub fn new(name: impl Into<String>, year: i32) -> Self {
        Self {
            name: name.into(),
            year: Some(year),
        }
    }

    /// Parses the `{name}_{year}` selector value. The year is split off the last underscore.
    pub fn parse(value: &str) -> Option<Self> {
        let (name, year) = value.trim().rsplit_once('_')?;
        let year = year.trim().parse::<i32>().ok()?;
        Some(Self::new(name, year))
    }

    pub fn value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}_{}", self.name, year),
            None => write!(f, "{}_NaN", self.name),
        }
    }
}

/// One observed storm position. Uncoercible numerics are kept as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormRecord {
    pub name: String,
    pub year: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub wind_speed: f64,
    pub distance_to_land_km: f64,
    pub nature: NatureCode,
    pub impactful: String,
}

impl StormRecord {
    pub fn from_row(row: StormRow) -> Self {
        Self {
            latitude: coerce_number(&row.latitude),
            longitude: coerce_number(&row.longitude),
            wind_speed: coerce_number(&row.wind_speed),
            distance_to_land_km: coerce_number(&row.distance_to_land),
            year: coerce_integer(&row.year),
            nature: NatureCode::from_code(&row.nature),
            name: row.storm_name,
            impactful: row.impactful,
        }
    }

    pub fn key(&self) -> StormKey {
        StormKey {
            name: self.name.clone(),
            year: self.year,
        }
    }

    pub fn matches(&self, key: &StormKey) -> bool {
        self.year.is_some() && self.year == key.year && self.name == key.name
    }

    pub fn category(&self) -> StormCategory {
        StormCategory::from_wind_speed(self.wind_speed)
    }
}

/// Converts rows in order; nothing is dropped.
pub fn parse_storm_rows<I>(rows: I) -> Vec<StormRecord>
where
    I: IntoIterator<Item = StormRow>,
{
    rows.into_iter().map(StormRecord::from_row).collect()
}

pub fn read_storm_csv<R: Read>(reader: R) -> Result<Vec<StormRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<StormRow>()
        .collect::<Result<Vec<_>, _>>()?;

    let records = parse_storm_rows(rows);
    let incomplete = records
        .iter()
        .filter(|record| !record.latitude.is_finite() || !record.longitude.is_finite())
        .count();
    tracing::debug!(records = records.len(), incomplete, "parsed storm table");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn row(name: &str, latitude: &str, year: &str) -> StormRow {
        StormRow {
            storm_name: name.to_string(),
            latitude: latitude.to_string(),
            longitude: "-80.0".to_string(),
            wind_speed: "85".to_string(),
            distance_to_land: "120".to_string(),
            nature: "TS".to_string(),
            impactful: "Yes".to_string(),
            year: year.to_string(),
        }
    }

    #[test]
    fn non_numeric_fields_become_nan_without_dropping_rows() {
        let records = parse_storm_rows(vec![
            row("Andrew", "25.5", "1992"),
            row("Hugo", "not-a-number", "1989"),
            row("Mitch", "15.0", "unknown"),
        ]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Andrew");
        assert!(records[1].latitude.is_nan());
        assert_eq!(records[1].year, Some(1989));
        assert_eq!(records[2].year, None);
    }

    #[test]
    fn storm_key_requires_name_and_year() {
        let record = StormRecord::from_row(row("Katrina", "25.9", "2005"));
        assert!(record.matches(&StormKey::new("Katrina", 2005)));
        assert!(!record.matches(&StormKey::new("Katrina", 2012)));
        assert!(!record.matches(&StormKey::new("Rita", 2005)));

        let yearless = StormRecord::from_row(row("Katrina", "25.9", ""));
        assert!(!yearless.matches(&StormKey {
            name: "Katrina".to_string(),
            year: None,
        }));
    }

    #[test]
    fn storm_key_parses_selector_values() {
        assert_eq!(
            StormKey::parse("Katrina_2005"),
            Some(StormKey::new("Katrina", 2005))
        );
        assert_eq!(
            StormKey::parse("Storm_One_1999"),
            Some(StormKey::new("Storm_One", 1999))
        );
        assert_eq!(StormKey::parse("Katrina"), None);
        assert_eq!(StormKey::parse("Katrina_abc"), None);
        assert_eq!(StormKey::new("Ian", 2022).value(), "Ian_2022");
    }

    #[test]
    fn csv_reader_keeps_row_order_and_tolerates_missing_columns() {
        let csv = "storm_name,latitude,longitude,wind_speed,year\n\
Bravo,20.0,-70.0,50,2010\n\
Alpha,21.0,-71.0,60,2009\n";
        let records = read_storm_csv(Cursor::new(csv)).expect("csv parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Bravo");
        assert_eq!(records[1].name, "Alpha");
        assert!(records[0].distance_to_land_km.is_nan());
        assert_eq!(records[0].nature, NatureCode::Other(String::new()));
        assert_eq!(records[0].category(), StormCategory::TropicalStorm);
    }

    #[test]
    fn short_rows_are_kept_with_nan_fields() {
        let csv = "storm_name,latitude,longitude,wind_speed,distance_to_land,nature,Impactful,year\n\
Katrina,25.9,-80.3,70,120,TS,Yes,2005\n\
Rita,26.0,-81.0\n";
        let records = read_storm_csv(Cursor::new(csv)).expect("ragged rows load");

        assert_eq!(records.len(), 2);
        let rita = &records[1];
        assert_eq!(rita.name, "Rita");
        assert_eq!(rita.latitude, 26.0);
        assert!(rita.wind_speed.is_nan());
        assert!(rita.distance_to_land_km.is_nan());
        assert_eq!(rita.year, None);
    }
}
