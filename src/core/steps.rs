use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tool_call::ToolCall;

/// One message of an agent conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// The user turn that started the run
    Task { content: String },
    /// A reply from the model, possibly requesting tool calls
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of executing one requested tool call
    Observation {
        tool_call_id: String,
        tool_name: String,
        result: String,
        is_error: bool,
    },
}

impl AgentStep {
    /// Plain assistant reply without tool calls
    pub fn assistant_text(content: impl Into<String>) -> Self {
        AgentStep::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Text of an assistant message (empty for a bare tool-call turn)
    pub fn assistant_content(&self) -> Option<&str> {
        match self {
            AgentStep::Assistant { content, .. } => Some(content.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// Convert step to OpenAI message format
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => json!({
                "role": "user",
                "content": content
            }),
            AgentStep::Assistant {
                content,
                tool_calls,
            } => {
                let mut message = json!({
                    "role": "assistant",
                    "content": content
                });
                if !tool_calls.is_empty() {
                    message["tool_calls"] =
                        tool_calls.iter().map(ToolCall::to_openai_format).collect();
                }
                message
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": result
            }),
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", content),
            AgentStep::Assistant {
                content,
                tool_calls,
            } if !tool_calls.is_empty() => {
                let calls: Vec<String> = tool_calls.iter().map(ToolCall::describe).collect();
                match content.as_deref().filter(|text| !text.is_empty()) {
                    Some(text) => format!("🔧 Action: {} ({})", calls.join(", "), text),
                    None => format!("🔧 Action: {}", calls.join(", ")),
                }
            }
            AgentStep::Assistant { content, .. } => {
                format!("💬 Reply: {}", content.as_deref().unwrap_or(""))
            }
            AgentStep::Observation {
                tool_name,
                result,
                is_error,
                ..
            } => {
                if *is_error {
                    format!("❌ Error from {}: {}", tool_name, result)
                } else {
                    format!("👁 Observation from {}: {}", tool_name, result)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_turn_to_message() {
        let step = AgentStep::Assistant {
            content: None,
            tool_calls: vec![ToolCall::new(
                "call_9",
                "maps_text_search",
                json!({ "keywords": "museum" }),
            )],
        };

        let message = step.to_message();
        assert_eq!(message["role"], "assistant");
        assert!(message["content"].is_null());
        assert_eq!(message["tool_calls"][0]["id"], "call_9");
        assert_eq!(
            message["tool_calls"][0]["function"]["arguments"],
            r#"{"keywords":"museum"}"#
        );
    }

    #[test]
    fn test_plain_reply_has_no_tool_calls_key() {
        let message = AgentStep::assistant_text("done").to_message();
        assert!(message.get("tool_calls").is_none());
        assert_eq!(message["content"], "done");
    }

    #[test]
    fn test_observation_to_message() {
        let step = AgentStep::Observation {
            tool_call_id: "call_9".to_string(),
            tool_name: "maps_text_search".to_string(),
            result: "[]".to_string(),
            is_error: false,
        };

        let message = step.to_message();
        assert_eq!(message["role"], "tool");
        assert_eq!(message["tool_call_id"], "call_9");
    }

    #[test]
    fn test_assistant_content() {
        assert_eq!(
            AgentStep::assistant_text("hi").assistant_content(),
            Some("hi")
        );
        let bare = AgentStep::Assistant {
            content: None,
            tool_calls: vec![],
        };
        assert_eq!(bare.assistant_content(), Some(""));
        let task = AgentStep::Task {
            content: "x".to_string(),
        };
        assert_eq!(task.assistant_content(), None);
    }
}
