use serde::{Deserialize, Serialize};

use crate::types::TripPlan;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Envelope for `POST /api/trip/plan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlanResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TripPlan>,
}

impl TripPlanResponse {
    pub fn ok(plan: TripPlan) -> Self {
        Self {
            success: true,
            message: "trip plan generated".to_string(),
            data: Some(plan),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
