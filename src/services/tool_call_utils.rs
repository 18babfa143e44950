use crate::{core::ToolCall, error::AgentError};
use serde_json::{Map, Value};

/// Tool calls carried by an assistant message, in the order the model listed them.
///
/// Arguments that fail to parse are kept as the raw string so the error can
/// be reported back to the model against the right call id.
pub(crate) fn tool_calls_from_message(message: &Value) -> Vec<ToolCall> {
    let Some(calls) = message.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    calls
        .iter()
        .enumerate()
        .map(|(idx, call)| {
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("call_{idx}"));
            let function = call.get("function");
            let name = function
                .and_then(|f| f.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let raw_arguments = function
                .and_then(|f| f.get("arguments"))
                .and_then(Value::as_str)
                .unwrap_or_default();

            let arguments = if raw_arguments.trim().is_empty() {
                Value::Object(Map::new())
            } else {
                serde_json::from_str(raw_arguments)
                    .unwrap_or_else(|_| Value::String(raw_arguments.to_string()))
            };

            ToolCall::new(id, name, arguments)
        })
        .collect()
}

/// Arguments ready to pass to a tool, or the reason they cannot be
pub(crate) fn checked_arguments(call: &ToolCall) -> Result<Value, AgentError> {
    if call.name.is_empty() {
        return Err(AgentError::InvalidFunctionCall(
            "tool call missing function name".to_string(),
        ));
    }

    match &call.arguments {
        Value::Object(_) => Ok(call.arguments.clone()),
        Value::String(raw) => Err(AgentError::InvalidFunctionCall(format!(
            "failed to parse arguments for tool '{}': {}",
            call.name, raw
        ))),
        other => Err(AgentError::InvalidFunctionCall(format!(
            "arguments for tool '{}' must be a JSON object, got {}",
            call.name, other
        ))),
    }
}

/// Text content of an assistant message, if any
pub(crate) fn message_content(message: &Value) -> Option<String> {
    match message.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(""),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_calls_in_order() {
        let message = json!({
            "role": "assistant",
            "tool_calls": [
                {"id": "a", "type": "function", "function": {"name": "maps_weather", "arguments": "{\"city\":\"Hangzhou\"}"}},
                {"id": "b", "type": "function", "function": {"name": "maps_geo", "arguments": ""}}
            ]
        });

        let calls = tool_calls_from_message(&message);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "maps_weather");
        assert_eq!(calls[0].arguments, json!({"city": "Hangzhou"}));
        assert_eq!(calls[1].arguments, json!({}));
    }

    #[test]
    fn test_bad_arguments_are_reported() {
        let message = json!({
            "tool_calls": [{"function": {"name": "maps_weather", "arguments": "{city"}}]
        });

        let calls = tool_calls_from_message(&message);
        assert_eq!(calls[0].id, "call_0");
        let err = checked_arguments(&calls[0]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FUNCTION_CALL");
    }

    #[test]
    fn test_missing_name_is_reported() {
        let call = ToolCall::new("x", "", json!({}));
        assert!(checked_arguments(&call).is_err());
    }

    #[test]
    fn test_no_tool_calls() {
        assert!(tool_calls_from_message(&json!({"content": "hi"})).is_empty());
        assert!(tool_calls_from_message(&json!({"tool_calls": null})).is_empty());
    }

    #[test]
    fn test_message_content_variants() {
        assert_eq!(
            message_content(&json!({"content": "plain"})),
            Some("plain".to_string())
        );
        let parts = json!({
            "content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]
        });
        assert_eq!(message_content(&parts), Some("ab".to_string()));
        assert_eq!(message_content(&json!({"content": null})), None);
    }
}
