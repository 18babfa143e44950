use std::{fmt, sync::Arc};

use async_trait::async_trait;

use super::{
    prompts,
    state::{PlanState, StageField, StateUpdate},
};
use crate::{core::ConversationAgent, error::Result, types::TripRequest};

/// Builds a stage's user turn from the trip request
pub type QueryBuilder = fn(&TripRequest) -> String;

/// One step of the pipeline: state in, update for its own slot out.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Slot this stage writes
    fn field(&self) -> StageField;

    async fn run(&self, state: &PlanState) -> Result<StateUpdate>;
}

/// A search stage: one query built from the request, sent to one agent.
pub struct QueryStage {
    field: StageField,
    agent: Arc<dyn ConversationAgent>,
    query: QueryBuilder,
}

impl QueryStage {
    pub fn new(field: StageField, agent: Arc<dyn ConversationAgent>, query: QueryBuilder) -> Self {
        Self {
            field,
            agent,
            query,
        }
    }

    pub fn attraction(agent: Arc<dyn ConversationAgent>) -> Self {
        Self::new(StageField::Attraction, agent, prompts::attraction_query)
    }

    pub fn hotel(agent: Arc<dyn ConversationAgent>) -> Self {
        Self::new(StageField::Hotel, agent, prompts::hotel_query)
    }

    pub fn weather(agent: Arc<dyn ConversationAgent>) -> Self {
        Self::new(StageField::Weather, agent, prompts::weather_query)
    }
}

impl fmt::Debug for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStage")
            .field("field", &self.field)
            .field("agent", &self.agent.name())
            .finish()
    }
}

#[async_trait]
impl Stage for QueryStage {
    fn field(&self) -> StageField {
        self.field
    }

    async fn run(&self, state: &PlanState) -> Result<StateUpdate> {
        let query = (self.query)(state.request());
        let response = self.agent.invoke(&query).await?;
        Ok(StateUpdate::new(self.field, response.output_text()))
    }
}
