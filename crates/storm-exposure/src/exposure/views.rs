use super::classify::{PmlTier, PremiumAdequacy, StormCategory};
use super::filter::StormTrack;
use super::properties::{LocationHistory, PropertyBook, PropertyRecord};
use super::storms::{StormKey, StormRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const TRAJECTORY_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const LOCATION_PALETTE: [&str; 10] = [
    "blue", "red", "green", "purple", "orange", "yellow", "cyan", "magenta", "lime", "pink",
];

#[derive(Debug, Clone, Serialize)]
pub struct StormPointView {
    pub name: String,
    pub year: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub wind_speed: f64,
    pub category: StormCategory,
    pub category_label: &'static str,
    pub color: &'static str,
    pub radius: f64,
    pub nature_code: String,
    pub nature_label: String,
    pub distance_to_land_km: f64,
    pub impactful: String,
}

impl StormPointView {
    pub fn from_record(record: &StormRecord) -> Self {
        let category = record.category();
        Self {
            name: record.name.clone(),
            year: record.year,
            latitude: record.latitude,
            longitude: record.longitude,
            wind_speed: record.wind_speed,
            category,
            category_label: category.label(),
            color: category.color(),
            radius: record.wind_speed * 0.1,
            nature_code: record.nature.code().to_string(),
            nature_label: record.nature.label().to_string(),
            distance_to_land_km: record.distance_to_land_km,
            impactful: record.impactful.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryView {
    pub key: String,
    pub name: String,
    pub year: Option<i32>,
    pub color: &'static str,
    pub path: Vec<[f64; 2]>,
}

impl TrajectoryView {
    /// Colour is picked from the palette by position so repeated renders stay stable.
    pub fn from_track(index: usize, track: &StormTrack) -> Self {
        Self {
            key: track.key.value(),
            name: track.key.name.clone(),
            year: track.key.year,
            color: TRAJECTORY_PALETTE[index % TRAJECTORY_PALETTE.len()],
            path: track.path(),
        }
    }
}

/// Dashed connector from a property to the hurricane position recorded against it.
#[derive(Debug, Clone, Serialize)]
pub struct HurricaneLinkView {
    pub property: [f64; 2],
    pub hurricane: [f64; 2],
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedFigures {
    pub total_insured_value: String,
    pub premium: String,
    pub non_catastrophe_loss: String,
    pub estimated_catastrophe_loss: String,
    pub probable_max_loss: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySnapshotView {
    pub location_id: String,
    pub policy_year: Option<i32>,
    pub total_insured_value: f64,
    pub premium: f64,
    pub non_catastrophe_loss: f64,
    pub estimated_catastrophe_loss: f64,
    pub probable_max_loss: f64,
    pub pml_tier: PmlTier,
    pub pml_tier_label: &'static str,
    pub pml_color: &'static str,
    pub pml_level_label: String,
    pub at_risk: String,
    pub adequacy: PremiumAdequacy,
    pub adequacy_label: &'static str,
    pub formatted: FormattedFigures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hurricane: Option<HurricaneLinkView>,
}

impl PropertySnapshotView {
    pub fn from_record(record: &PropertyRecord) -> Self {
        let hurricane = (record.hurricane_latitude.is_finite()
            && record.hurricane_longitude.is_finite())
        .then(|| HurricaneLinkView {
            property: [record.latitude, record.longitude],
            hurricane: [record.hurricane_latitude, record.hurricane_longitude],
            distance_km: record.distance_to_hurricane_km,
        });

        Self {
            location_id: record.location_id.clone(),
            policy_year: record.policy_year,
            total_insured_value: record.total_insured_value,
            premium: record.premium,
            non_catastrophe_loss: record.non_catastrophe_loss,
            estimated_catastrophe_loss: record.estimated_catastrophe_loss,
            probable_max_loss: record.probable_max_loss,
            pml_tier: record.pml_tier,
            pml_tier_label: record.pml_tier.label(),
            pml_color: record.pml_tier.color(),
            pml_level_label: record.pml_level_label.clone(),
            at_risk: record.at_risk.clone(),
            adequacy: record.adequacy,
            adequacy_label: record.adequacy.label(),
            formatted: FormattedFigures {
                total_insured_value: format_currency(record.total_insured_value),
                premium: format_currency(record.premium),
                non_catastrophe_loss: format_currency(record.non_catastrophe_loss),
                estimated_catastrophe_loss: format_currency(record.estimated_catastrophe_loss),
                probable_max_loss: format_currency(record.probable_max_loss),
            },
            hurricane,
        }
    }
}

/// House marker for one location with the year slider bounds and the default snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyMarkerView {
    pub location_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_color: &'static str,
    /// Recorded years, ascending. Records without a year still count towards the marker.
    pub years: Vec<i32>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub default_year: Option<i32>,
    pub snapshot: PropertySnapshotView,
}

impl PropertyMarkerView {
    /// Builds markers for the locations present in `records`, in first-seen order.
    pub fn from_filtered(book: &PropertyBook, records: &[PropertyRecord]) -> Vec<Self> {
        let mut order: Vec<&str> = Vec::new();
        let mut grouped: HashMap<&str, Vec<&PropertyRecord>> = HashMap::new();
        for record in records {
            let entry = grouped.entry(record.location_id.as_str()).or_default();
            if entry.is_empty() {
                order.push(record.location_id.as_str());
            }
            entry.push(record);
        }

        order
            .into_iter()
            .filter_map(|location_id| {
                let group = grouped.get(location_id)?;
                let first = group.first()?;
                let coordinates = book
                    .get(location_id)
                    .map(LocationHistory::coordinates)
                    .unwrap_or((first.latitude, first.longitude));
                Some(Self::build(
                    location_id,
                    coordinates,
                    location_color(book, location_id),
                    first,
                    group,
                ))
            })
            .collect()
    }

    fn build(
        location_id: &str,
        (latitude, longitude): (f64, f64),
        area_color: &'static str,
        first: &PropertyRecord,
        records: &[&PropertyRecord],
    ) -> Self {
        let mut years: Vec<i32> = records
            .iter()
            .filter_map(|record| record.policy_year)
            .collect();
        years.sort_unstable();
        let min_year = years.first().copied();
        let max_year = years.last().copied();
        let current = max_year
            .and_then(|year| {
                records
                    .iter()
                    .find(|record| record.policy_year == Some(year))
                    .copied()
            })
            .unwrap_or(first);

        Self {
            location_id: location_id.to_string(),
            latitude,
            longitude,
            area_color,
            years,
            min_year,
            max_year,
            default_year: max_year,
            snapshot: PropertySnapshotView::from_record(current),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormOption {
    pub value: String,
    pub label: String,
    /// First recorded position, used to centre the map on selection.
    pub focus: Option<[f64; 2]>,
}

/// Unique `(name, year)` pairs in first-seen order.
pub fn storm_options(storms: &[StormRecord]) -> Vec<StormOption> {
    let mut seen: HashSet<StormKey> = HashSet::new();
    let mut options = Vec::new();
    for record in storms {
        let key = record.key();
        if !seen.insert(key.clone()) {
            continue;
        }
        let year = record
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "NaN".to_string());
        let focus = (record.latitude.is_finite() && record.longitude.is_finite())
            .then_some([record.latitude, record.longitude]);
        options.push(StormOption {
            value: key.value(),
            label: format!("{} ({})", record.name, year),
            focus,
        });
    }
    options
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationOption {
    pub value: String,
    pub label: String,
    pub color: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_span: Option<(i32, i32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<LocationAreaView>,
}

/// Shaded polygon through every recorded position of a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAreaView {
    pub coordinates: Vec<[f64; 2]>,
    pub color: &'static str,
    pub fill_opacity: f64,
}

impl LocationAreaView {
    const FILL_OPACITY: f64 = 0.2;

    pub fn from_history(history: &LocationHistory, color: &'static str) -> Option<Self> {
        let coordinates: Vec<[f64; 2]> = history
            .records()
            .iter()
            .filter(|record| record.latitude.is_finite() && record.longitude.is_finite())
            .map(|record| [record.latitude, record.longitude])
            .collect();
        if coordinates.is_empty() {
            return None;
        }
        Some(Self {
            coordinates,
            color,
            fill_opacity: Self::FILL_OPACITY,
        })
    }
}

pub fn location_options(book: &PropertyBook) -> Vec<LocationOption> {
    book.locations()
        .iter()
        .map(|history| {
            let (latitude, longitude) = history.coordinates();
            let color = location_color(book, history.location_id());
            LocationOption {
                value: history.location_id().to_string(),
                label: format!("Location {}", history.location_id()),
                color,
                latitude,
                longitude,
                year_span: history.year_span(),
                area: LocationAreaView::from_history(history, color),
            }
        })
        .collect()
}

/// Numeric ids cycle through the palette by value, others by load position.
pub fn location_color(book: &PropertyBook, location_id: &str) -> &'static str {
    let slot = match location_id.trim().parse::<usize>() {
        Ok(value) => value,
        Err(_) => book
            .locations()
            .iter()
            .position(|history| history.location_id() == location_id)
            .unwrap_or(0),
    };
    LOCATION_PALETTE[slot % LOCATION_PALETTE.len()]
}

/// `$`-prefixed figure with comma grouping on the integer part.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = value.to_string();
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (position, digit) in integer.chars().enumerate() {
        if position > 0 && (integer.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
