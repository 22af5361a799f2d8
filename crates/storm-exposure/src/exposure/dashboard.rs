use super::breakdown::CategoryBreakdown;
use super::filter::{FilterEngine, FilterSelection, FilteredView};
use super::source::Datasets;
use super::storms::StormKey;
use super::views::{
    location_options, storm_options, LocationOption, PropertyMarkerView, PropertySnapshotView,
    StormOption, StormPointView, TrajectoryView,
};
use chrono::{Datelike, Local};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Result of one filter pass, tagged with the revision it was submitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub revision: u64,
    pub view: FilteredView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub storm_points: usize,
    pub storm_tracks: usize,
    pub trajectories: usize,
    pub properties: usize,
    pub locations: usize,
}

/// Everything the map and chart widgets need for one render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub revision: u64,
    pub summary: FrameSummary,
    pub storm_points: Vec<StormPointView>,
    pub trajectories: Vec<TrajectoryView>,
    pub properties: Vec<PropertyMarkerView>,
    pub breakdown: CategoryBreakdown,
}

impl RenderFrame {
    pub fn build(datasets: &Datasets, view: &FilteredView, revision: u64) -> Self {
        let storm_points = view
            .tracks
            .iter()
            .flat_map(|track| track.points.iter())
            .map(StormPointView::from_record)
            .collect();
        let trajectories: Vec<TrajectoryView> = view
            .trajectories()
            .enumerate()
            .map(|(index, track)| TrajectoryView::from_track(index, track))
            .collect();
        let properties = PropertyMarkerView::from_filtered(&datasets.properties, &view.properties);

        Self {
            revision,
            summary: FrameSummary {
                storm_points: view.storms.len(),
                storm_tracks: view.tracks.len(),
                trajectories: trajectories.len(),
                properties: view.properties.len(),
                locations: properties.len(),
            },
            storm_points,
            trajectories,
            properties,
            breakdown: CategoryBreakdown::from_storms(&view.storms),
        }
    }
}

/// Output side of the dashboard: map layers, chart, or a terminal printer.
pub trait RenderSink {
    fn render(&mut self, frame: &RenderFrame);
}

/// Controller owning the loaded datasets and the current control state.
///
/// Outcomes are committed latest-wins: an outcome older than the last one rendered is dropped.
#[derive(Debug)]
pub struct Dashboard {
    datasets: Arc<Datasets>,
    selection: FilterSelection,
    next_revision: u64,
    committed: Option<u64>,
}

impl Dashboard {
    pub fn new(datasets: Arc<Datasets>) -> Self {
        Self {
            datasets,
            selection: FilterSelection::default(),
            next_revision: 1,
            committed: None,
        }
    }

    pub fn datasets(&self) -> &Arc<Datasets> {
        &self.datasets
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn submit(&mut self, selection: FilterSelection) -> FilterOutcome {
        self.submit_at(selection, current_year())
    }

    pub fn submit_at(&mut self, selection: FilterSelection, current_year: i32) -> FilterOutcome {
        self.selection = selection;
        self.recompute(current_year)
    }

    /// Flips trajectory drawing and recomputes with the rest of the selection unchanged.
    pub fn set_show_trajectories(&mut self, show: bool, current_year: i32) -> FilterOutcome {
        self.selection.show_trajectories = show;
        self.recompute(current_year)
    }

    fn recompute(&mut self, current_year: i32) -> FilterOutcome {
        let revision = self.next_revision;
        self.next_revision += 1;

        let view = FilterEngine::apply(
            &self.selection,
            &self.datasets.storms,
            &self.datasets.properties,
            current_year,
        );
        debug!(
            revision,
            storms = view.storms.len(),
            properties = view.properties.len(),
            "filter pass complete"
        );

        FilterOutcome { revision, view }
    }

    /// Renders the outcome unless a newer one has already been committed.
    pub fn commit<S: RenderSink + ?Sized>(&mut self, outcome: &FilterOutcome, sink: &mut S) -> bool {
        if self
            .committed
            .is_some_and(|committed| committed >= outcome.revision)
        {
            debug!(
                revision = outcome.revision,
                "dropping stale filter outcome"
            );
            return false;
        }

        let frame = RenderFrame::build(&self.datasets, &outcome.view, outcome.revision);
        sink.render(&frame);
        self.committed = Some(outcome.revision);
        true
    }

    pub fn last_committed(&self) -> Option<u64> {
        self.committed
    }

    pub fn storm_options(&self) -> Vec<StormOption> {
        storm_options(&self.datasets.storms)
    }

    pub fn location_options(&self) -> Vec<LocationOption> {
        location_options(&self.datasets.properties)
    }

    /// First recorded position of a storm, for centring the map.
    pub fn storm_focus(&self, key: &StormKey) -> Option<[f64; 2]> {
        self.datasets
            .storms
            .iter()
            .find(|record| record.matches(key))
            .map(|record| [record.latitude, record.longitude])
    }

    pub fn location_snapshot(&self, location_id: &str, year: i32) -> Option<PropertySnapshotView> {
        self.datasets
            .properties
            .get(location_id)?
            .for_year(year)
            .map(PropertySnapshotView::from_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::source::{DataSource, InlineDataSource};

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<RenderFrame>,
    }

    impl RenderSink for RecordingSink {
        fn render(&mut self, frame: &RenderFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn dashboard() -> Dashboard {
        let source = InlineDataSource {
            storm_csv: "storm_name,latitude,longitude,wind_speed,distance_to_land,year\n\
Sandy,32.0,-75.0,85,210,2012\n\
Sandy,39.4,-74.4,80,15,2012\n\
Ian,26.7,-82.2,135,5,2022\n"
                .to_string(),
            property_csv: "Location,Latitude,Longitude,Premium,PolicyYear,PML\n\
1,25.7,-80.1,\"12,000\",2021,\"300,000\"\n\
1,25.7,-80.1,\"12,500\",2022,\"180,000\"\n"
                .to_string(),
        };
        Dashboard::new(Arc::new(source.load().expect("inline data loads")))
    }

    #[test]
    fn latest_outcome_wins() {
        let mut dashboard = dashboard();
        let mut sink = RecordingSink::default();

        let first = dashboard.submit_at(FilterSelection::default(), 2024);
        let second = dashboard.submit_at(
            FilterSelection::default().with_storm(StormKey::new("Ian", 2022)),
            2024,
        );
        assert!(second.revision > first.revision);

        assert!(dashboard.commit(&second, &mut sink));
        assert!(!dashboard.commit(&first, &mut sink), "stale outcome dropped");
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].summary.storm_points, 1);
        assert_eq!(dashboard.last_committed(), Some(second.revision));
    }

    #[test]
    fn trajectory_toggle_keeps_other_controls() {
        let mut dashboard = dashboard();
        let mut sink = RecordingSink::default();
        dashboard.submit_at(
            FilterSelection::default().with_storm(StormKey::new("Sandy", 2012)),
            2024,
        );

        let outcome = dashboard.set_show_trajectories(true, 2024);
        assert!(dashboard.commit(&outcome, &mut sink));

        let frame = &sink.frames[0];
        assert_eq!(frame.summary.storm_points, 2);
        assert_eq!(frame.trajectories.len(), 1);
        assert_eq!(frame.trajectories[0].path, vec![[39.4, -74.4], [32.0, -75.0]]);
        assert_eq!(frame.storm_points[0].distance_to_land_km, 15.0);
    }

    #[test]
    fn lookups_support_dropdowns_and_year_scrubbing() {
        let dashboard = dashboard();
        let storms: Vec<String> = dashboard
            .storm_options()
            .into_iter()
            .map(|option| option.value)
            .collect();
        assert_eq!(storms, vec!["Sandy_2012", "Ian_2022"]);
        assert_eq!(
            dashboard.storm_focus(&StormKey::new("Ian", 2022)),
            Some([26.7, -82.2])
        );
        assert_eq!(dashboard.storm_focus(&StormKey::new("Ian", 1999)), None);

        let locations = dashboard.location_options();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].label, "Location 1");

        let snapshot = dashboard
            .location_snapshot("1", 2021)
            .expect("2021 snapshot");
        assert_eq!(snapshot.formatted.premium, "$12,000");
        assert!(dashboard.location_snapshot("1", 2019).is_none());
        assert!(dashboard.location_snapshot("missing", 2021).is_none());
    }

    #[test]
    fn repeated_selection_is_idempotent() {
        let mut dashboard = dashboard();
        let selection = FilterSelection::default().with_location("1");
        let first = dashboard.submit_at(selection.clone(), 2024);
        let second = dashboard.submit_at(selection, 2024);
        // Debug output compares unparsed NaN cells as equal.
        assert_eq!(format!("{:?}", first.view), format!("{:?}", second.view));
        assert_eq!(first.view.properties.len(), 2);
    }
}
