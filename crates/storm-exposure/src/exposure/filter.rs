use super::classify::{PmlTier, PremiumAdequacy};
use super::numeric::{coerce_number, finite};
use super::properties::{PropertyBook, PropertyRecord};
use super::storms::{StormKey, StormRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum StormSelector {
    #[default]
    All,
    Storm(StormKey),
    /// A selector value that names no storm; matches nothing.
    Unmatched(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LocationSelector {
    #[default]
    All,
    Location(String),
}

/// Constraint on a classified property field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Criterion<T> {
    Any,
    Is(T),
    /// Unrecognised filter value; matches nothing.
    Unmatched(String),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T: PartialEq> Criterion<T> {
    fn from_param(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Self {
        match non_wildcard(raw) {
            None => Self::Any,
            Some(value) => parse(value)
                .map(Self::Is)
                .unwrap_or_else(|| Self::Unmatched(value.to_string())),
        }
    }

    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Is(expected) => expected == value,
            Self::Unmatched(_) => false,
        }
    }
}

/// Map-drawn selection box. A `None` side imposes no constraint; bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lng_min: Option<f64>,
    pub lng_max: Option<f64>,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min: Some(lat_min),
            lat_max: Some(lat_max),
            lng_min: Some(lng_min),
            lng_max: Some(lng_max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lat_min.is_none()
            && self.lat_max.is_none()
            && self.lng_min.is_none()
            && self.lng_max.is_none()
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.lat_min.map_or(true, |min| latitude >= min)
            && self.lat_max.map_or(true, |max| latitude <= max)
            && self.lng_min.map_or(true, |min| longitude >= min)
            && self.lng_max.map_or(true, |max| longitude <= max)
    }
}

/// Current state of the dashboard controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterSelection {
    pub storm: StormSelector,
    /// `None` and `Some(0)` both mean "all years".
    pub lookback_years: Option<u32>,
    pub location: LocationSelector,
    pub adequacy: Criterion<PremiumAdequacy>,
    pub pml_tier: Criterion<PmlTier>,
    pub bbox: Option<BoundingBox>,
    pub show_trajectories: bool,
}

impl FilterSelection {
    pub fn with_storm(mut self, key: StormKey) -> Self {
        self.storm = StormSelector::Storm(key);
        self
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location = LocationSelector::Location(location_id.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    fn year_window(&self, current_year: i32) -> Option<(i64, i64)> {
        match self.lookback_years {
            None | Some(0) => None,
            Some(years) => {
                let current = i64::from(current_year);
                Some((current - i64::from(years), current))
            }
        }
    }
}

/// Raw control values as they arrive from a query string or CLI flags.
///
/// Conversion is permissive: values that fail to parse impose no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub storm: Option<String>,
    #[serde(default)]
    pub lookback_years: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub adequacy: Option<String>,
    #[serde(default)]
    pub pml: Option<String>,
    #[serde(default)]
    pub lat_min: Option<String>,
    #[serde(default)]
    pub lat_max: Option<String>,
    #[serde(default)]
    pub lng_min: Option<String>,
    #[serde(default)]
    pub lng_max: Option<String>,
    #[serde(default)]
    pub trajectories: Option<String>,
}

impl FilterParams {
    pub fn into_selection(self) -> FilterSelection {
        let storm = match non_wildcard(self.storm.as_deref()) {
            Some(value) => StormKey::parse(value)
                .map(StormSelector::Storm)
                .unwrap_or_else(|| StormSelector::Unmatched(value.to_string())),
            None => StormSelector::All,
        };

        let location = match non_wildcard(self.location.as_deref()) {
            Some(value) => LocationSelector::Location(value.to_string()),
            None => LocationSelector::All,
        };

        let bbox = BoundingBox {
            lat_min: parse_bound(self.lat_min.as_deref()),
            lat_max: parse_bound(self.lat_max.as_deref()),
            lng_min: parse_bound(self.lng_min.as_deref()),
            lng_max: parse_bound(self.lng_max.as_deref()),
        };

        FilterSelection {
            storm,
            lookback_years: self
                .lookback_years
                .as_deref()
                .and_then(|raw| raw.trim().parse::<u32>().ok()),
            location,
            adequacy: Criterion::from_param(
                self.adequacy.as_deref(),
                PremiumAdequacy::from_filter_value,
            ),
            pml_tier: Criterion::from_param(self.pml.as_deref(), PmlTier::from_filter_value),
            bbox: (!bbox.is_unbounded()).then_some(bbox),
            show_trajectories: self
                .trajectories
                .as_deref()
                .map(|raw| {
                    matches!(
                        raw.trim().to_ascii_lowercase().as_str(),
                        "1" | "true" | "on" | "yes"
                    )
                })
                .unwrap_or(false),
        }
    }
}

fn non_wildcard(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    match value {
        "" | "all" | "all_storm" => None,
        other => Some(other),
    }
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| finite(coerce_number(value)))
}

/// Positions of one storm track ordered by ascending distance to land.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormTrack {
    pub key: StormKey,
    pub points: Vec<StormRecord>,
    pub show_path: bool,
}

impl StormTrack {
    pub fn path(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|point| [point.latitude, point.longitude])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilteredView {
    pub storms: Vec<StormRecord>,
    pub properties: Vec<PropertyRecord>,
    pub tracks: Vec<StormTrack>,
}

impl FilteredView {
    /// Tracks that should be drawn as polylines.
    pub fn trajectories(&self) -> impl Iterator<Item = &StormTrack> {
        self.tracks.iter().filter(|track| track.show_path)
    }
}

/// Pure recompute step run on every control change.
pub struct FilterEngine;

impl FilterEngine {
    pub fn apply(
        selection: &FilterSelection,
        storms: &[StormRecord],
        properties: &PropertyBook,
        current_year: i32,
    ) -> FilteredView {
        let filtered_storms = Self::filter_storms(selection, storms, current_year);
        let tracks = Self::group_tracks(&filtered_storms, selection.show_trajectories);

        FilteredView {
            properties: Self::filter_properties(selection, properties),
            storms: filtered_storms,
            tracks,
        }
    }

    pub fn filter_properties(
        selection: &FilterSelection,
        properties: &PropertyBook,
    ) -> Vec<PropertyRecord> {
        properties
            .records()
            .filter(|record| Self::property_matches(selection, record))
            .cloned()
            .collect()
    }

    pub fn property_matches(selection: &FilterSelection, record: &PropertyRecord) -> bool {
        let location_ok = match &selection.location {
            LocationSelector::All => true,
            LocationSelector::Location(id) => record.location_id == *id,
        };
        let bbox_ok = selection
            .bbox
            .map_or(true, |bbox| bbox.contains(record.latitude, record.longitude));
        let adequacy_ok = selection.adequacy.admits(&record.adequacy);
        let pml_ok = selection.pml_tier.admits(&record.pml_tier);

        location_ok && bbox_ok && adequacy_ok && pml_ok
    }

    pub fn filter_storms(
        selection: &FilterSelection,
        storms: &[StormRecord],
        current_year: i32,
    ) -> Vec<StormRecord> {
        let window = selection.year_window(current_year);
        storms
            .iter()
            .filter(|record| Self::storm_matches(selection, window, record))
            .cloned()
            .collect()
    }

    fn storm_matches(
        selection: &FilterSelection,
        window: Option<(i64, i64)>,
        record: &StormRecord,
    ) -> bool {
        let storm_ok = match &selection.storm {
            StormSelector::All => true,
            StormSelector::Storm(key) => record.matches(key),
            StormSelector::Unmatched(_) => false,
        };
        let year_ok = match window {
            None => true,
            Some((start, end)) => record
                .year
                .map(i64::from)
                .is_some_and(|year| year >= start && year <= end),
        };
        let bbox_ok = selection
            .bbox
            .map_or(true, |bbox| bbox.contains(record.latitude, record.longitude));

        storm_ok && year_ok && bbox_ok
    }

    /// Groups points by storm key in first-seen order and sorts each group by distance to land.
    pub fn group_tracks(storms: &[StormRecord], show_trajectories: bool) -> Vec<StormTrack> {
        let mut positions: HashMap<StormKey, usize> = HashMap::new();
        let mut tracks: Vec<StormTrack> = Vec::new();

        for record in storms {
            let key = record.key();
            match positions.get(&key) {
                Some(&position) => tracks[position].points.push(record.clone()),
                None => {
                    positions.insert(key.clone(), tracks.len());
                    tracks.push(StormTrack {
                        key,
                        points: vec![record.clone()],
                        show_path: false,
                    });
                }
            }
        }

        for track in &mut tracks {
            track
                .points
                .sort_by(|a, b| a.distance_to_land_km.total_cmp(&b.distance_to_land_km));
            track.show_path = show_trajectories && track.points.len() > 1;
        }

        tracks
    }
}
