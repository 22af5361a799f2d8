use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::filter::FilterParams;
use super::service::ExposureService;

/// Router builder exposing the map and chart feeds.
pub fn exposure_router(service: Arc<ExposureService>) -> Router {
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler))
        .route("/api/v1/storms", get(storm_options_handler))
        .route("/api/v1/locations", get(location_options_handler))
        .route(
            "/api/v1/locations/:location_id/years/:year",
            get(snapshot_handler),
        )
        .with_state(service)
}

pub(crate) async fn dashboard_handler(
    State(service): State<Arc<ExposureService>>,
    Query(params): Query<FilterParams>,
) -> Response {
    let selection = params.into_selection();
    let frame = service.frame(&selection);
    tracing::debug!(
        revision = frame.revision,
        storms = frame.summary.storm_points,
        properties = frame.summary.properties,
        "dashboard frame served"
    );
    (StatusCode::OK, Json(frame)).into_response()
}

pub(crate) async fn storm_options_handler(
    State(service): State<Arc<ExposureService>>,
) -> Response {
    (StatusCode::OK, Json(service.storm_options())).into_response()
}

pub(crate) async fn location_options_handler(
    State(service): State<Arc<ExposureService>>,
) -> Response {
    (StatusCode::OK, Json(service.location_options())).into_response()
}

pub(crate) async fn snapshot_handler(
    State(service): State<Arc<ExposureService>>,
    Path((location_id, year)): Path<(String, i32)>,
) -> Response {
    match service.snapshot(&location_id, year) {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => {
            let payload = json!({
                "location_id": location_id,
                "policy_year": year,
                "error": "no policy year recorded for location",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}
