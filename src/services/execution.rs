use crate::{
    core::{agent::Agent, memory::AgentMemory, steps::AgentStep, ConversationAgent, ToolCall},
    error::{AgentError, Result},
    services::{
        openai_client::ChatCompletionRequest,
        tool_call_utils::{checked_arguments, message_content, tool_calls_from_message},
    },
    types::result::{RunResult, TokenUsage},
};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

impl Agent {
    /// Run one user turn to completion.
    ///
    /// Each iteration sends the whole conversation; tool calls in the reply are
    /// executed and their observations appended before the next iteration. The
    /// turn ends with the first assistant reply that requests no tools. Tool
    /// failures are fed back to the model rather than aborting the turn.
    pub async fn run_turn(&self, prompt: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(self.name(), self.system_prompt().map(str::to_string));
        memory.add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        let tools = self.function_factory().get_openai_tools();
        debug!(
            agent = self.name(),
            tools = self.function_factory().tool_count(),
            "agent turn started"
        );
        let mut usage: Option<TokenUsage> = None;

        for iteration in 1..=self.max_iterations() {
            let mut chat_request = ChatCompletionRequest::new(self.model(), memory.as_messages())
                .with_max_tokens(self.max_tokens())
                .with_temperature(self.temperature());

            if !tools.is_empty() {
                chat_request = chat_request
                    .with_tools(tools.clone())
                    .with_tool_choice(json!("auto"));
            }

            let response = self
                .chat_model()
                .chat_completion(&chat_request.into_value())
                .await?;

            let assistant_message = first_assistant_message(&response)?;
            if let Some(turn_usage) = token_usage(&response) {
                usage = Some(usage.unwrap_or_default().add(turn_usage));
            }

            let tool_calls = tool_calls_from_message(assistant_message);
            let content = message_content(assistant_message);
            let finished = tool_calls.is_empty();

            memory.add_step(AgentStep::Assistant {
                content,
                tool_calls: tool_calls.clone(),
            });

            if finished {
                debug!(
                    iteration,
                    steps = memory.step_count(),
                    "agent turn complete"
                );
                return Ok(RunResult::new(
                    memory.into_steps(),
                    usage,
                    start_time.elapsed(),
                    iteration,
                ));
            }

            for call in &tool_calls {
                let observation = self.execute_tool_call(call).await;
                memory.add_step(observation);
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations()))
    }

    async fn execute_tool_call(&self, call: &ToolCall) -> AgentStep {
        let outcome = match checked_arguments(call) {
            Ok(arguments) => {
                self.function_factory()
                    .execute_function(&call.name, arguments)
                    .await
            }
            Err(err) => Err(err),
        };

        let (result, is_error) = match outcome {
            Ok(Value::String(text)) => (text, false),
            Ok(value) => (value.to_string(), false),
            Err(err) => (err.to_error_payload().to_string(), true),
        };

        AgentStep::Observation {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            result,
            is_error,
        }
    }
}

fn first_assistant_message(response: &Value) -> Result<&Value> {
    let provider_error = |message: &str| AgentError::Provider(message.to_string());

    response
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| provider_error("missing 'choices' array in completion response"))?
        .first()
        .ok_or_else(|| provider_error("completion response contained no choices"))?
        .get("message")
        .ok_or_else(|| provider_error("completion response missing assistant message"))
}

fn token_usage(response: &Value) -> Option<TokenUsage> {
    let usage = response.get("usage")?;
    Some(TokenUsage {
        prompt_tokens: usage.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: usage.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: usage.get("total_tokens")?.as_u64()? as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_assistant_message_errors() {
        assert!(first_assistant_message(&json!({})).is_err());
        assert!(first_assistant_message(&json!({"choices": []})).is_err());
        assert!(first_assistant_message(&json!({"choices": [{}]})).is_err());

        let ok = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(first_assistant_message(&ok).unwrap()["content"], "hi");
    }

    #[test]
    fn test_token_usage() {
        let response = json!({
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        });
        assert_eq!(
            token_usage(&response),
            Some(TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 3,
                total_tokens: 15
            })
        );
        assert_eq!(token_usage(&json!({})), None);
    }
}
