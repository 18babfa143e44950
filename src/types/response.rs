use std::any::{type_name, TypeId};

use serde_json::Value;

use crate::{
    error::{AgentError, Result},
    schemas::{CompletionSchema, SchemaHandle},
    types::result::RunResult,
};

/// What an agent hands back after one conversation turn.
#[derive(Debug, Clone)]
pub enum AgentResponse {
    /// Full message trace of a tool-calling run
    Messages(RunResult),
    /// Anything else; only its string form is used
    Opaque(Value),
}

impl AgentResponse {
    /// Text the pipeline stores for this response.
    ///
    /// For a message trace this is every assistant message's text, in order,
    /// joined with newlines. An opaque JSON string is used verbatim; any other
    /// opaque value is serialized.
    pub fn output_text(&self) -> String {
        match self {
            AgentResponse::Messages(run) => run.assistant_text(),
            AgentResponse::Opaque(Value::String(text)) => text.clone(),
            AgentResponse::Opaque(other) => other.to_string(),
        }
    }
}

impl From<RunResult> for AgentResponse {
    fn from(run: RunResult) -> Self {
        AgentResponse::Messages(run)
    }
}

/// Deserialize `payload` into `T`, reporting the JSON path of the first mismatch.
pub fn deserialize_structured_response<T>(payload: &Value, schema: &SchemaHandle) -> Result<T>
where
    T: CompletionSchema,
{
    ensure_schema_matches::<T>(schema)?;

    serde_path_to_error::deserialize(payload).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        AgentError::Validation(format!(
            "failed to deserialize `{}` at {}: {}",
            schema.schema_name(),
            location,
            err.into_inner()
        ))
    })
}

fn ensure_schema_matches<T: 'static>(schema: &SchemaHandle) -> Result<()> {
    if schema.type_id() != TypeId::of::<T>() {
        return Err(AgentError::Validation(format!(
            "schema `{}` does not match target type `{}`",
            schema.schema_name(),
            type_name::<T>(),
        )));
    }
    Ok(())
}
