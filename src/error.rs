use thiserror::Error;

use crate::pipeline::StageField;

/// Main error type for agents and the planning pipeline
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("stage output `{0}` is missing or empty")]
    MissingStageOutput(StageField),

    #[error("stage output `{0}` was already written")]
    StageConflict(StageField),

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: StageField,
        #[source]
        source: Box<AgentError>,
    },

    #[error("Itinerary could not be determined: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Why the planner's text could not be turned into an itinerary
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no structured data found in planner response")]
    NoStructuredData,

    #[error("planner response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("planner JSON does not match the itinerary schema: {0}")]
    SchemaMismatch(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Wrap an error raised while `stage` was running
    pub fn in_stage(self, stage: StageField) -> Self {
        match self {
            already @ AgentError::StageFailed { .. } => already,
            other => AgentError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Http(_) => true,
            AgentError::Validation(_) => true,
            AgentError::RateLimit { .. } => true,
            AgentError::Timeout(_) => true,
            AgentError::StageFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Http(_) => "HTTP_ERROR",
            AgentError::Provider(_) => "PROVIDER_ERROR",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Validation(_) => "VALIDATION_ERROR",
            AgentError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            AgentError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            AgentError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            AgentError::Timeout(_) => "TIMEOUT_ERROR",
            AgentError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            AgentError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            AgentError::Mcp(_) => "MCP_ERROR",
            AgentError::MissingStageOutput(_) => "MISSING_STAGE_OUTPUT",
            AgentError::StageConflict(_) => "STAGE_CONFLICT",
            AgentError::StageFailed { .. } => "STAGE_FAILED",
            AgentError::Extraction(_) => "EXTRACTION_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_is_not_nested() {
        let err = AgentError::Timeout("slow".to_string())
            .in_stage(StageField::Hotel)
            .in_stage(StageField::Weather);

        match &err {
            AgentError::StageFailed { stage, source } => {
                assert_eq!(*stage, StageField::Hotel);
                assert!(matches!(**source, AgentError::Timeout(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "hotel stage failed: Timeout error: slow");
    }

    #[test]
    fn test_extraction_payload() {
        let err = AgentError::from(ExtractionError::NoStructuredData);
        let payload = err.to_error_payload();

        assert_eq!(payload["error"]["code"], "EXTRACTION_ERROR");
        assert_eq!(payload["error"]["retryable"], false);
        assert!(payload["error"]["message"]
            .as_str()
            .unwrap()
            .contains("no structured data"));
    }
}
