use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use storm_exposure::exposure::{exposure_router, Datasets, ExposureService};
use tower::ServiceExt;

fn app() -> Router {
    let storms = include_bytes!("fixtures/StormData.csv");
    let properties = include_bytes!("fixtures/PropertyData.csv");
    let datasets = Datasets::from_readers(&storms[..], &properties[..]).expect("fixtures load");
    exposure_router(Arc::new(ExposureService::new(Arc::new(datasets))))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn dashboard_frame_reflects_query_filters() {
    let (status, body) = get_json(
        app(),
        "/api/v1/dashboard?storm=Katrina_2005&trajectories=true&adequacy=inadequate",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["storm_points"], 3);
    assert_eq!(body["summary"]["trajectories"], 1);
    assert_eq!(body["summary"]["properties"], 2);
    assert_eq!(body["trajectories"][0]["key"], "Katrina_2005");
    assert_eq!(body["storm_points"][0]["distance_to_land_km"], 0.0);
}

#[tokio::test]
async fn wildcards_and_garbage_impose_no_constraint() {
    let (status, body) = get_json(
        app(),
        "/api/v1/dashboard?storm=all_storm&location=all&lookback_years=soon&lat_min=abc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["storm_points"], 9);
    assert_eq!(body["summary"]["properties"], 4);
    assert_eq!(body["trajectories"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unrecognised_selectors_return_empty_results() {
    let (status, body) = get_json(app(), "/api/v1/dashboard?storm=Katrina").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["storm_points"], 0);
    assert_eq!(body["summary"]["properties"], 4);

    let (_, body) = get_json(app(), "/api/v1/dashboard?pml=critical&adequacy=bogus").await;
    assert_eq!(body["summary"]["properties"], 0);
    assert_eq!(body["summary"]["storm_points"], 9);
}

#[tokio::test]
async fn revisions_increase_across_requests() {
    let router = app();
    let (_, first) = get_json(router.clone(), "/api/v1/dashboard").await;
    let (_, second) = get_json(router, "/api/v1/dashboard?pml=high").await;

    let first = first["revision"].as_u64().expect("revision");
    let second_revision = second["revision"].as_u64().expect("revision");
    assert!(second_revision > first);
    assert_eq!(second["summary"]["properties"], 2);
}

#[tokio::test]
async fn option_lists_cover_storms_and_locations() {
    let (_, storms) = get_json(app(), "/api/v1/storms").await;
    let values: Vec<&str> = storms
        .as_array()
        .expect("storm list")
        .iter()
        .filter_map(|option| option["value"].as_str())
        .collect();
    assert_eq!(
        values,
        vec!["Katrina_2005", "Katrina_2012", "Sandy_2012", "Ian_2022", "Ghost_2022"]
    );

    let (_, locations) = get_json(app(), "/api/v1/locations").await;
    assert_eq!(locations.as_array().map(Vec::len), Some(3));
    assert_eq!(locations[0]["label"], "Location 1");
}

#[tokio::test]
async fn snapshot_endpoint_scrubs_policy_years() {
    let (status, body) = get_json(app(), "/api/v1/locations/1/years/2021").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"]["premium"], "$12,000");
    assert_eq!(body["adequacy_label"], "Adequate");

    let (status, body) = get_json(app(), "/api/v1/locations/1/years/1990").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["policy_year"], 1990);
}
