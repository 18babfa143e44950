use super::steps::AgentStep;
use serde_json::{json, Value};
use tracing::info;

/// Conversation history of one agent turn, rendered to OpenAI messages on demand
#[derive(Debug, Clone)]
pub struct AgentMemory {
    agent: String,
    system_prompt: Option<String>,
    steps: Vec<AgentStep>,
}

impl AgentMemory {
    pub fn new(agent: impl Into<String>, system_prompt: Option<String>) -> Self {
        Self {
            agent: agent.into(),
            system_prompt,
            steps: Vec::new(),
        }
    }

    /// Add a step to memory
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "tripagent::steps", agent = %self.agent, "{}", step.describe());
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[AgentStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.steps
    }

    /// System prompt (if any) followed by every step
    pub fn as_messages(&self) -> Vec<Value> {
        let system = self.system_prompt.as_ref().map(|prompt| {
            json!({
                "role": "system",
                "content": prompt
            })
        });

        system
            .into_iter()
            .chain(self.steps.iter().map(AgentStep::to_message))
            .collect()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
