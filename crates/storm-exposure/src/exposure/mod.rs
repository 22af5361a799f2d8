//! Storm track and property exposure pipeline: parse once, filter per interaction, render views.

pub mod breakdown;
pub mod classify;
pub mod dashboard;
pub mod filter;
pub mod numeric;
pub mod properties;
mod router;
mod service;
pub mod source;
pub mod storms;
pub mod views;

pub use breakdown::CategoryBreakdown;
pub use classify::{nature_label, NatureCode, PmlTier, PremiumAdequacy, StormCategory};
pub use dashboard::{Dashboard, FilterOutcome, RenderFrame, RenderSink};
pub use filter::{
    BoundingBox, Criterion, FilterEngine, FilterParams, FilterSelection, FilteredView,
    LocationSelector, StormSelector, StormTrack,
};
pub use properties::{LocationHistory, PropertyBook, PropertyRecord, PropertyRow};
pub use router::exposure_router;
pub use service::ExposureService;
pub use source::{CsvDataSource, DataSource, DataSourceError, Datasets, InlineDataSource};
pub use storms::{StormKey, StormRecord, StormRow};
pub use views::LocationAreaView;
