use std::{fmt, sync::Arc};

use async_trait::async_trait;

use super::{
    prompts,
    stage::Stage,
    state::{PlanState, StageField, StateUpdate},
};
use crate::{core::ConversationAgent, error::Result};

/// Terminal stage: folds the three search results into the planner prompt.
pub struct PlannerStage {
    agent: Arc<dyn ConversationAgent>,
}

impl PlannerStage {
    pub fn new(agent: Arc<dyn ConversationAgent>) -> Self {
        Self { agent }
    }

    /// Planner prompt for `state`.
    ///
    /// Fails with `MissingStageOutput` unless attraction, hotel and weather
    /// text are all present and non-empty.
    pub fn build_prompt(state: &PlanState) -> Result<String> {
        let attraction = state.require(StageField::Attraction)?;
        let hotel = state.require(StageField::Hotel)?;
        let weather = state.require(StageField::Weather)?;

        Ok(prompts::planner_query(state.request(), attraction, weather, hotel))
    }
}

impl fmt::Debug for PlannerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerStage")
            .field("agent", &self.agent.name())
            .finish()
    }
}

#[async_trait]
impl Stage for PlannerStage {
    fn field(&self) -> StageField {
        StageField::Planner
    }

    async fn run(&self, state: &PlanState) -> Result<StateUpdate> {
        let prompt = Self::build_prompt(state)?;
        let response = self.agent.invoke(&prompt).await?;
        Ok(StateUpdate::new(StageField::Planner, response.output_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AgentError, types::AgentResponse, types::TripRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAgent(AtomicUsize);

    #[async_trait]
    impl ConversationAgent for CountingAgent {
        fn name(&self) -> &str {
            "planner"
        }

        async fn invoke(&self, _user_turn: &str) -> Result<AgentResponse> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(AgentResponse::Opaque(serde_json::json!("{}")))
        }
    }

    fn state() -> PlanState {
        PlanState::new(TripRequest {
            city: "Xi'an".to_string(),
            start_date: "2026-09-01".to_string(),
            end_date: "2026-09-03".to_string(),
            travel_days: 3,
            transportation: "taxi".to_string(),
            accommodation: "mid-range".to_string(),
            preferences: vec![],
            free_text_input: None,
        })
    }

    #[tokio::test]
    async fn test_planner_refuses_to_run_before_upstream_stages() {
        let agent = Arc::new(CountingAgent(AtomicUsize::new(0)));
        let stage = PlannerStage::new(agent.clone());

        let mut partial = state();
        partial
            .apply(StateUpdate::new(StageField::Attraction, "Terracotta Army"))
            .unwrap();
        partial
            .apply(StateUpdate::new(StageField::Weather, "clear"))
            .unwrap();

        let err = stage.run(&partial).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingStageOutput(StageField::Hotel)));
        assert_eq!(agent.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_planner_runs_with_full_state() {
        let agent = Arc::new(CountingAgent(AtomicUsize::new(0)));
        let stage = PlannerStage::new(agent.clone());

        let mut full = state();
        full.apply(StateUpdate::new(StageField::Attraction, "City Wall"))
            .unwrap();
        full.apply(StateUpdate::new(StageField::Hotel, "Bell Tower Hotel"))
            .unwrap();
        full.apply(StateUpdate::new(StageField::Weather, "hot"))
            .unwrap();

        let update = stage.run(&full).await.unwrap();
        assert_eq!(update, StateUpdate::new(StageField::Planner, "{}"));
        assert_eq!(agent.0.load(Ordering::SeqCst), 1);

        let prompt = PlannerStage::build_prompt(&full).unwrap();
        assert!(prompt.contains("Bell Tower Hotel"));
        assert!(prompt.contains("- Preferences: none\n"));
    }
}
