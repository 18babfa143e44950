#![cfg(feature = "server")]

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{planner_reply, request, scripted_pipeline, CallLog, Reply};
use serde_json::{json, Value};
use tower::ServiceExt;
use trip_agent_rs::{
    server::{router, AppState},
    Settings, TripRequest,
};

fn app(planner: Reply) -> (Router, CallLog) {
    let log = CallLog::default();
    let pipeline = scripted_pipeline(planner, &log);
    let settings = Settings::default();
    let state = Arc::new(AppState::new(&settings, pipeline));
    (router(state, &settings.cors_origins_list()), log)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_trip(request: &TripRequest) -> Request<Body> {
    post_plan(serde_json::to_string(request).unwrap())
}

fn post_plan(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/trip/plan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = app(Reply::Text(planner_reply()));

    let (status, body) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "trip-agent");
    assert_eq!(body["status"], "running");

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "trip-agent");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_plan_success() {
    let (app, log) = app(Reply::Text(planner_reply()));

    let (status, body) = send(app, post_trip(&request(&[]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["city"], "Hangzhou");
    assert_eq!(
        body["data"]["days"][0]["attractions"][0]["name"],
        "West Lake"
    );
    assert_eq!(log.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_invalid_request_is_rejected_before_planning() {
    let (app, log) = app(Reply::Text(planner_reply()));
    let mut req = request(&[]);
    req.travel_days = 0;

    let (status, body) = send(app, post_trip(&req)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("travel_days"));
    assert!(body.get("data").is_none());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body() {
    let (app, _) = app(Reply::Text(planner_reply()));

    let (status, body) = send(app, post_plan(json!({"city": "Hangzhou"}).to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_undetermined_itinerary_is_a_server_error() {
    let (app, _) = app(Reply::Text("No plan today.".to_string()));

    let (status, body) = send(app, post_trip(&request(&[]))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("failed to generate trip plan: "));
}

#[tokio::test]
async fn test_stage_failure_is_a_server_error() {
    let (app, _) = app(Reply::Fail("planner unavailable"));

    let (status, body) = send(app, post_trip(&request(&[]))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("planner stage failed"));
    assert!(message.contains("planner unavailable"));
}
