use super::dashboard::{current_year, RenderFrame};
use super::filter::{FilterEngine, FilterSelection};
use super::source::{DataSource, DataSourceError, Datasets};
use super::views::{
    location_options, storm_options, LocationOption, PropertySnapshotView, StormOption,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, read-only view over the loaded datasets for concurrent request handlers.
///
/// Every frame carries an increasing revision so the browser can discard late responses.
#[derive(Debug)]
pub struct ExposureService {
    datasets: Arc<Datasets>,
    revisions: AtomicU64,
}

impl ExposureService {
    pub fn new(datasets: Arc<Datasets>) -> Self {
        Self {
            datasets,
            revisions: AtomicU64::new(0),
        }
    }

    pub fn load<S: DataSource + ?Sized>(source: &S) -> Result<Self, DataSourceError> {
        Ok(Self::new(Arc::new(source.load()?)))
    }

    pub fn datasets(&self) -> &Arc<Datasets> {
        &self.datasets
    }

    pub fn frame(&self, selection: &FilterSelection) -> RenderFrame {
        self.frame_at(selection, current_year())
    }

    pub fn frame_at(&self, selection: &FilterSelection, current_year: i32) -> RenderFrame {
        let revision = self.revisions.fetch_add(1, Ordering::Relaxed) + 1;
        let view = FilterEngine::apply(
            selection,
            &self.datasets.storms,
            &self.datasets.properties,
            current_year,
        );
        RenderFrame::build(&self.datasets, &view, revision)
    }

    pub fn storm_options(&self) -> Vec<StormOption> {
        storm_options(&self.datasets.storms)
    }

    pub fn location_options(&self) -> Vec<LocationOption> {
        location_options(&self.datasets.properties)
    }

    pub fn snapshot(&self, location_id: &str, year: i32) -> Option<PropertySnapshotView> {
        self.datasets
            .properties
            .get(location_id)?
            .for_year(year)
            .map(PropertySnapshotView::from_record)
    }
}
