use super::classify::{PmlTier, PremiumAdequacy};
use super::numeric::{coerce_grouped, coerce_integer, coerce_number};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use tracing::{info, warn};

/// Raw property row from the exposure export. Column names follow the spreadsheet headers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRow {
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: String,
    #[serde(rename = "Longitude", default)]
    pub longitude: String,
    #[serde(rename = "Total Insured Value", default)]
    pub total_insured_value: String,
    #[serde(rename = "Premium", default)]
    pub premium: String,
    #[serde(rename = "Non-Catastrophy Loss", default)]
    pub non_catastrophe_loss: String,
    #[serde(rename = "Estimated_Catastrophe_Loss", default)]
    pub estimated_catastrophe_loss: String,
    #[serde(rename = "Hurricane_Latitude", default)]
    pub hurricane_latitude: String,
    #[serde(rename = "Hurricane_Longitude", default)]
    pub hurricane_longitude: String,
    #[serde(rename = "Distance_km", default)]
    pub distance_km: String,
    #[serde(rename = "PolicyYear", default)]
    pub policy_year: String,
    #[serde(rename = "AtRisk", default)]
    pub at_risk: String,
    #[serde(rename = "PML", default)]
    pub pml: String,
    #[serde(rename = "Level of PML", default)]
    pub level_of_pml: String,
}

/// One policy-year snapshot for a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub location_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `None` when the export cell is blank or not a whole number.
    pub policy_year: Option<i32>,
    pub total_insured_value: f64,
    pub premium: f64,
    pub non_catastrophe_loss: f64,
    pub estimated_catastrophe_loss: f64,
    pub hurricane_latitude: f64,
    pub hurricane_longitude: f64,
    pub distance_to_hurricane_km: f64,
    pub at_risk: String,
    pub probable_max_loss: f64,
    /// Label carried from the export; filters use `pml_tier` instead.
    pub pml_level_label: String,
    pub pml_tier: PmlTier,
    pub adequacy: PremiumAdequacy,
}

impl PropertyRecord {
    pub fn total_loss(&self) -> f64 {
        self.non_catastrophe_loss + self.estimated_catastrophe_loss
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("missing location id")]
    MissingLocation,
    #[error("latitude/longitude are not numeric")]
    InvalidCoordinates,
    #[error("policy year {year} already recorded for location {location_id}")]
    DuplicatePolicyYear { location_id: String, year: i32 },
}

/// Validates and coerces a single row. Losses fall back to zero; other money fields may be `NaN`.
pub fn parse_property_row(row: PropertyRow) -> Result<PropertyRecord, RejectReason> {
    let location_id = row.location.trim().to_string();
    if location_id.is_empty() {
        return Err(RejectReason::MissingLocation);
    }

    let latitude = coerce_number(&row.latitude);
    let longitude = coerce_number(&row.longitude);
    if latitude.is_nan() || longitude.is_nan() {
        return Err(RejectReason::InvalidCoordinates);
    }

    let policy_year = coerce_integer(&row.policy_year);

    let premium = coerce_grouped(&row.premium);
    let non_catastrophe_loss = zero_if_nan(coerce_grouped(&row.non_catastrophe_loss));
    let estimated_catastrophe_loss = zero_if_nan(coerce_grouped(&row.estimated_catastrophe_loss));
    let probable_max_loss = coerce_grouped(&row.pml);

    Ok(PropertyRecord {
        location_id,
        latitude,
        longitude,
        policy_year,
        total_insured_value: coerce_grouped(&row.total_insured_value),
        premium,
        non_catastrophe_loss,
        estimated_catastrophe_loss,
        hurricane_latitude: coerce_number(&row.hurricane_latitude),
        hurricane_longitude: coerce_number(&row.hurricane_longitude),
        distance_to_hurricane_km: coerce_number(&row.distance_km),
        at_risk: row.at_risk,
        probable_max_loss,
        pml_level_label: row.level_of_pml,
        pml_tier: PmlTier::from_pml(probable_max_loss),
        adequacy: PremiumAdequacy::assess(non_catastrophe_loss, estimated_catastrophe_loss, premium),
    })
}

fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// All policy years recorded for one location, in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHistory {
    location_id: String,
    latitude: f64,
    longitude: f64,
    records: Vec<PropertyRecord>,
}

impl LocationHistory {
    fn start(record: PropertyRecord) -> Self {
        Self {
            location_id: record.location_id.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            records: vec![record],
        }
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    /// Coordinates of the first record seen for this location.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn by_year(&self) -> Vec<&PropertyRecord> {
        let mut ordered: Vec<&PropertyRecord> = self.records.iter().collect();
        ordered.sort_by_key(|record| record.policy_year);
        ordered
    }

    pub fn for_year(&self, year: i32) -> Option<&PropertyRecord> {
        self.records
            .iter()
            .find(|record| record.policy_year == Some(year))
    }

    /// Earliest and latest recorded years; records without a year are skipped.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = || self.records.iter().filter_map(|record| record.policy_year);
        Some((years().min()?, years().max()?))
    }
}

/// Property exposure grouped by location, keeping first-seen location order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBook {
    locations: Vec<LocationHistory>,
    index: HashMap<String, usize>,
    rejected: usize,
}

impl PropertyBook {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = PropertyRow>,
    {
        let mut book = Self::default();
        for (line, row) in rows.into_iter().enumerate() {
            let outcome = parse_property_row(row).and_then(|record| book.insert(record));
            if let Err(reason) = outcome {
                warn!(row = line + 1, %reason, "skipping invalid property entry");
                book.rejected += 1;
            }
        }

        if book.rejected > 0 {
            info!(
                rejected = book.rejected,
                locations = book.locations.len(),
                "property rows rejected during load"
            );
        }
        book
    }

    fn insert(&mut self, record: PropertyRecord) -> Result<(), RejectReason> {
        match self.index.get(&record.location_id) {
            Some(&position) => {
                let history = &mut self.locations[position];
                if let Some(year) = record.policy_year {
                    if history.for_year(year).is_some() {
                        return Err(RejectReason::DuplicatePolicyYear {
                            location_id: record.location_id,
                            year,
                        });
                    }
                }
                history.records.push(record);
            }
            None => {
                self.index
                    .insert(record.location_id.clone(), self.locations.len());
                self.locations.push(LocationHistory::start(record));
            }
        }
        Ok(())
    }

    pub fn get(&self, location_id: &str) -> Option<&LocationHistory> {
        self.index
            .get(location_id)
            .map(|&position| &self.locations[position])
    }

    pub fn locations(&self) -> &[LocationHistory] {
        &self.locations
    }

    /// Every record, location by location, each location in row order.
    pub fn records(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.locations
            .iter()
            .flat_map(|history| history.records.iter())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.locations
            .iter()
            .map(|history| history.records.len())
            .sum()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

pub fn read_property_csv<R: Read>(reader: R) -> Result<PropertyBook, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<PropertyRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PropertyBook::from_rows(rows))
}
