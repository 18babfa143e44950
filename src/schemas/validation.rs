use crate::{error::AgentError, schemas::SchemaHandle};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Check `payload` against the handle's draft-7 schema.
///
/// At most three violations are reported, each prefixed with its instance path.
pub fn validate_against_schema(schema: &SchemaHandle, payload: &Value) -> Result<(), AgentError> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
        .map_err(|err| {
            AgentError::Validation(format!(
                "failed to compile `{}` schema: {}",
                schema.schema_name(),
                err
            ))
        })?;

    let Err(errors) = validator.validate(payload) else {
        return Ok(());
    };

    let mut details = Vec::new();
    let mut truncated = false;
    for (idx, error) in errors.enumerate() {
        if idx == MAX_SCHEMA_ERRORS {
            truncated = true;
            break;
        }
        let path = error.instance_path.to_string();
        let path = if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        };
        details.push(format!("{}: {}", path, error));
    }

    let mut detail_str = if details.is_empty() {
        "payload failed schema validation".to_string()
    } else {
        details.join("; ")
    };
    if truncated {
        detail_str.push_str("; additional errors truncated");
    }

    Err(AgentError::Validation(format!(
        "payload does not match `{}` schema: {}",
        schema.schema_name(),
        detail_str
    )))
}
