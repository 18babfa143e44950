use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use super::{
    state::AppState,
    types::{HealthResponse, ServiceInfo, TripPlanResponse},
};
use crate::types::TripRequest;

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: state.app_name.clone(),
        version: state.version.clone(),
        status: "running".to_string(),
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.app_name.clone(),
        version: state.version.clone(),
    })
}

/// POST /api/trip/plan
pub async fn plan_trip(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TripRequest>, JsonRejection>,
) -> (StatusCode, Json<TripPlanResponse>) {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(TripPlanResponse::failed(rejection.body_text())),
            )
        }
    };

    if let Err(err) = request.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(TripPlanResponse::failed(err.to_string())),
        );
    }

    info!(
        target: "tripagent::server",
        city = %request.city,
        start_date = %request.start_date,
        end_date = %request.end_date,
        days = request.travel_days,
        "trip plan requested"
    );

    let result = match state.pipeline.plan_trip(request).await {
        Ok(outcome) => outcome.into_itinerary(),
        Err(err) => Err(err),
    };

    match result {
        Ok(plan) => {
            info!(target: "tripagent::server", days = plan.days.len(), "trip plan generated");
            (StatusCode::OK, Json(TripPlanResponse::ok(plan)))
        }
        Err(err) => {
            error!(target: "tripagent::server", error = %err, "trip planning failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TripPlanResponse::failed(format!(
                    "failed to generate trip plan: {}",
                    err
                ))),
            )
        }
    }
}
