use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{info, warn};

use super::{
    extract::extract_itinerary,
    planner::PlannerStage,
    prompts,
    stage::{QueryStage, Stage},
    state::{PlanState, StageField, StateUpdate},
};
use crate::{
    config::Settings,
    core::{Agent, ConversationAgent},
    error::{AgentError, ExtractionError, Result},
    services::openai_client::{ChatModel, OpenAIClient},
    tools::{McpToolset, Tool},
    types::{TripPlan, TripRequest},
};

/// Result of a pipeline run whose stages all succeeded.
///
/// Extraction failure does not fail the run; it is reported here so callers
/// can tell an unusable planner reply apart from a failed stage.
#[derive(Debug)]
pub struct PlanOutcome {
    pub state: PlanState,
    pub itinerary: std::result::Result<TripPlan, ExtractionError>,
}

impl PlanOutcome {
    pub fn planner_text(&self) -> &str {
        self.state.planner_text().unwrap_or_default()
    }

    /// Fold an extraction failure into the pipeline error channel.
    pub fn into_itinerary(self) -> Result<TripPlan> {
        self.itinerary.map_err(AgentError::from)
    }
}

/// Attraction, hotel, weather and planner stages, run in that order.
pub struct TripPipeline {
    stages: [Box<dyn Stage>; 4],
    stage_timeout: Option<Duration>,
}

impl TripPipeline {
    pub fn builder() -> TripPipelineBuilder {
        TripPipelineBuilder::default()
    }

    /// Wire the four agents from settings.
    ///
    /// All agents share `chat_model`; `tools` go to the three search agents
    /// and never to the planner.
    pub fn from_settings(
        settings: &Settings,
        chat_model: Arc<dyn ChatModel>,
        tools: &[Arc<dyn Tool>],
    ) -> Result<Self> {
        let agent = |name: &str, system_prompt: &str| {
            Agent::new(name, Arc::clone(&chat_model))
                .with_system_prompt(system_prompt)
                .with_model(settings.llm_model_id.clone())
                .with_max_iterations(settings.agent_max_iterations)
                .with_max_tokens(settings.llm_max_tokens)
                .with_temperature(Some(0.0))
        };
        let search_agent = |name: &str, system_prompt: &str| {
            Arc::new(agent(name, system_prompt).with_tools(tools))
        };

        let attraction = search_agent("attraction_agent", prompts::ATTRACTION_SYSTEM_PROMPT);
        let hotel = search_agent("hotel_agent", prompts::HOTEL_SYSTEM_PROMPT);
        let weather = search_agent("weather_agent", prompts::WEATHER_SYSTEM_PROMPT);
        let planner = Arc::new(agent("planner_agent", prompts::PLANNER_SYSTEM_PROMPT));

        Self::builder()
            .attraction_agent(attraction)
            .hotel_agent(hotel)
            .weather_agent(weather)
            .planner_agent(planner)
            .stage_timeout(settings.stage_timeout())
            .build()
    }

    /// Acquire the map toolset and build a pipeline on a live LLM client.
    ///
    /// The returned toolset must outlive the pipeline; shut it down after the
    /// pipeline has been dropped.
    pub async fn launch(settings: &Settings) -> Result<(Self, McpToolset)> {
        settings.ensure_valid()?;

        let toolset = McpToolset::acquire(&settings.mcp_server()).await?;
        if toolset.is_empty() {
            warn!(
                target: "tripagent::mcp",
                server = toolset.server(),
                "MCP server exposes no tools; search agents answer without map data"
            );
        }
        let chat_model: Arc<dyn ChatModel> = Arc::new(OpenAIClient::new(
            settings.llm_api_key.clone(),
            settings.llm_base_url.clone(),
            settings.llm_timeout(),
        )?);
        let pipeline = Self::from_settings(settings, chat_model, toolset.tools())?;

        Ok((pipeline, toolset))
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout
    }

    /// Run the four stages in order, merging each update before the next stage.
    ///
    /// The first failing stage ends the run; its error is wrapped with the
    /// stage name.
    pub async fn run_stages(&self, request: TripRequest) -> Result<PlanState> {
        let mut state = PlanState::new(request);

        for stage in &self.stages {
            let field = stage.field();
            let started = Instant::now();
            info!(target: "tripagent::pipeline", stage = %field, "stage started");

            let update = self
                .run_stage(stage.as_ref(), &state)
                .await
                .map_err(|err| err.in_stage(field))?;
            if update.field != field {
                return Err(AgentError::StageConflict(update.field).in_stage(field));
            }

            let output_len = update.text.len();
            state.apply(update).map_err(|err| err.in_stage(field))?;

            info!(
                target: "tripagent::pipeline",
                stage = %field,
                elapsed_ms = started.elapsed().as_millis() as u64,
                output_len,
                "stage finished"
            );
        }

        Ok(state)
    }

    /// Run every stage, then extract the itinerary from the planner's reply.
    pub async fn plan_trip(&self, request: TripRequest) -> Result<PlanOutcome> {
        info!(
            target: "tripagent::pipeline",
            city = %request.city,
            days = request.travel_days,
            "planning trip"
        );

        let state = self.run_stages(request).await?;
        let itinerary = extract_itinerary(state.planner_text().unwrap_or_default());

        match &itinerary {
            Ok(plan) => info!(
                target: "tripagent::pipeline",
                days = plan.days.len(),
                "itinerary extracted"
            ),
            Err(err) => warn!(
                target: "tripagent::extract",
                error = %err,
                "itinerary could not be determined"
            ),
        }

        Ok(PlanOutcome { state, itinerary })
    }

    async fn run_stage(&self, stage: &dyn Stage, state: &PlanState) -> Result<StateUpdate> {
        let Some(limit) = self.stage_timeout else {
            return stage.run(state).await;
        };

        match tokio::time::timeout(limit, stage.run(state)).await {
            Ok(update) => update,
            Err(_) => {
                let message = format!(
                    "{} stage did not finish within {}s",
                    stage.field(),
                    limit.as_secs_f64()
                );
                Err(AgentError::Timeout(message))
            }
        }
    }
}

impl fmt::Debug for TripPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<_> = self.stages.iter().map(|s| s.field()).collect();
        f.debug_struct("TripPipeline")
            .field("stages", &stages)
            .field("stage_timeout", &self.stage_timeout)
            .finish()
    }
}

/// Collects the four agents; every one is required.
#[derive(Default)]
pub struct TripPipelineBuilder {
    attraction: Option<Arc<dyn ConversationAgent>>,
    hotel: Option<Arc<dyn ConversationAgent>>,
    weather: Option<Arc<dyn ConversationAgent>>,
    planner: Option<Arc<dyn ConversationAgent>>,
    stage_timeout: Option<Duration>,
}

impl TripPipelineBuilder {
    pub fn attraction_agent(mut self, agent: Arc<dyn ConversationAgent>) -> Self {
        self.attraction = Some(agent);
        self
    }

    pub fn hotel_agent(mut self, agent: Arc<dyn ConversationAgent>) -> Self {
        self.hotel = Some(agent);
        self
    }

    pub fn weather_agent(mut self, agent: Arc<dyn ConversationAgent>) -> Self {
        self.weather = Some(agent);
        self
    }

    pub fn planner_agent(mut self, agent: Arc<dyn ConversationAgent>) -> Self {
        self.planner = Some(agent);
        self
    }

    /// Bound each stage's run time. Unset means stages may run indefinitely.
    pub fn stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<TripPipeline> {
        let attraction = required(self.attraction, StageField::Attraction)?;
        let hotel = required(self.hotel, StageField::Hotel)?;
        let weather = required(self.weather, StageField::Weather)?;
        let planner = required(self.planner, StageField::Planner)?;

        Ok(TripPipeline {
            stages: [
                Box::new(QueryStage::attraction(attraction)) as Box<dyn Stage>,
                Box::new(QueryStage::hotel(hotel)),
                Box::new(QueryStage::weather(weather)),
                Box::new(PlannerStage::new(planner)),
            ],
            stage_timeout: self.stage_timeout,
        })
    }
}

fn required<T>(slot: Option<T>, field: StageField) -> Result<T> {
    match slot {
        Some(agent) => Ok(agent),
        None => {
            let message = format!("no agent configured for the {field} stage");
            Err(AgentError::Config(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(&'static str);

    #[async_trait]
    impl ConversationAgent for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn invoke(&self, _user_turn: &str) -> Result<AgentResponse> {
            Ok(AgentResponse::Opaque(json!(self.0)))
        }
    }

    #[test]
    fn test_builder_requires_every_agent() {
        let err = TripPipeline::builder()
            .attraction_agent(Arc::new(Fixed("a")))
            .hotel_agent(Arc::new(Fixed("h")))
            .planner_agent(Arc::new(Fixed("p")))
            .build()
            .unwrap_err();

        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("weather"));
    }

    #[test]
    fn test_stage_order() {
        let pipeline = TripPipeline::builder()
            .attraction_agent(Arc::new(Fixed("a")))
            .hotel_agent(Arc::new(Fixed("h")))
            .weather_agent(Arc::new(Fixed("w")))
            .planner_agent(Arc::new(Fixed("p")))
            .build()
            .unwrap();

        let order: Vec<_> = pipeline.stages.iter().map(|s| s.field()).collect();
        assert_eq!(order, StageField::ORDER);
        assert_eq!(pipeline.stage_timeout(), None);
    }
}
