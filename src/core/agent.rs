use crate::{
    error::Result,
    services::openai_client::ChatModel,
    tools::{FunctionFactory, Tool},
    types::response::AgentResponse,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Something that takes one user turn and answers it.
///
/// The pipeline only talks to agents through this trait, so any tool calls an
/// implementation makes along the way stay invisible to it.
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, user_turn: &str) -> Result<AgentResponse>;
}

/// LLM agent bound to a system role and a toolset
#[derive(Debug)]
pub struct Agent {
    name: String,
    system_prompt: Option<String>,
    chat_model: Arc<dyn ChatModel>,
    function_factory: FunctionFactory,
    model: String,
    max_iterations: usize,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl Agent {
    pub fn new(name: impl Into<String>, chat_model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            chat_model,
            function_factory: FunctionFactory::new(),
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Bind a shared toolset; the same tools may be bound to several agents.
    pub fn with_tools(mut self, tools: &[Arc<dyn Tool>]) -> Self {
        for tool in tools {
            self.function_factory.register_shared(Arc::clone(tool));
        }
        self
    }

    pub fn with_function_factory(mut self, function_factory: FunctionFactory) -> Self {
        self.function_factory = function_factory;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub(crate) fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub(crate) fn chat_model(&self) -> &dyn ChatModel {
        self.chat_model.as_ref()
    }

    pub fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub(crate) fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

#[async_trait]
impl ConversationAgent for Agent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, user_turn: &str) -> Result<AgentResponse> {
        let run = self.run_turn(user_turn).await?;
        debug!(target: "tripagent::steps", agent = %self.name, "{}", run.replay());
        Ok(AgentResponse::Messages(run))
    }
}
