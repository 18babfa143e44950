use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AgentError, Result},
    types::TripRequest,
};

/// Text slots of the plan state, one per stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageField {
    Attraction,
    Hotel,
    Weather,
    Planner,
}

impl StageField {
    /// Run order of the pipeline
    pub const ORDER: [StageField; 4] = [
        StageField::Attraction,
        StageField::Hotel,
        StageField::Weather,
        StageField::Planner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageField::Attraction => "attraction",
            StageField::Hotel => "hotel",
            StageField::Weather => "weather",
            StageField::Planner => "planner",
        }
    }
}

impl fmt::Display for StageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update returned by a stage: its own slot and nothing else
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub field: StageField,
    pub text: String,
}

impl StateUpdate {
    pub fn new(field: StageField, text: impl Into<String>) -> Self {
        Self {
            field,
            text: text.into(),
        }
    }
}

/// State threaded through one pipeline run.
///
/// The request never changes; each text slot is written at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanState {
    request: TripRequest,
    attraction: Option<String>,
    hotel: Option<String>,
    weather: Option<String>,
    planner: Option<String>,
}

impl PlanState {
    pub fn new(request: TripRequest) -> Self {
        Self {
            request,
            attraction: None,
            hotel: None,
            weather: None,
            planner: None,
        }
    }

    pub fn request(&self) -> &TripRequest {
        &self.request
    }

    pub fn get(&self, field: StageField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Text of an upstream stage, which must already be present and non-empty.
    pub fn require(&self, field: StageField) -> Result<&str> {
        self.get(field)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AgentError::MissingStageOutput(field))
    }

    /// Merge a stage's update, refusing to overwrite a slot.
    pub fn apply(&mut self, update: StateUpdate) -> Result<()> {
        let slot = self.slot_mut(update.field);
        if slot.is_some() {
            return Err(AgentError::StageConflict(update.field));
        }
        *slot = Some(update.text);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        StageField::ORDER.iter().all(|f| self.get(*f).is_some())
    }

    /// Raw planner text, once the last stage has run
    pub fn planner_text(&self) -> Option<&str> {
        self.get(StageField::Planner)
    }

    fn slot(&self, field: StageField) -> &Option<String> {
        match field {
            StageField::Attraction => &self.attraction,
            StageField::Hotel => &self.hotel,
            StageField::Weather => &self.weather,
            StageField::Planner => &self.planner,
        }
    }

    fn slot_mut(&mut self, field: StageField) -> &mut Option<String> {
        match field {
            StageField::Attraction => &mut self.attraction,
            StageField::Hotel => &mut self.hotel,
            StageField::Weather => &mut self.weather,
            StageField::Planner => &mut self.planner,
        }
    }
}
