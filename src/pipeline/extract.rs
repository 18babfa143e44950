//! Turns the planner's free-form reply into a `TripPlan`.
//!
//! The JSON candidate is located by the first rule that applies:
//!
//! 1. a fence labelled ` ```json `: everything up to the next fence
//! 2. any other fence: everything up to the next fence
//! 3. the span from the first `{` to the last `}`
//!
//! A fence without a closing marker runs to the end of the text.

use serde_json::Value;
use tracing::debug;

use crate::{
    error::{AgentError, ExtractionError},
    schemas::{validate_against_schema, CompletionSchema},
    types::{deserialize_structured_response, TripPlan},
};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Where the JSON candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    LabeledFence,
    Fence,
    Braces,
}

fn locate_json(text: &str) -> Option<(Source, &str)> {
    if let Some(open) = text.find(JSON_FENCE) {
        return Some((Source::LabeledFence, fenced(text, open + JSON_FENCE.len())));
    }

    if let Some(open) = text.find(FENCE) {
        return Some((Source::Fence, fenced(text, open + FENCE.len())));
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    // "} ... {" has both braces but no object span.
    let span = if last > first {
        &text[first..=last]
    } else {
        ""
    };
    Some((Source::Braces, span))
}

fn fenced(text: &str, start: usize) -> &str {
    let body = &text[start..];
    let end = body.find(FENCE).unwrap_or(body.len());
    body[..end].trim()
}

/// Locate and parse the JSON object in a planner reply.
pub fn extract_json_value(text: &str) -> Result<Value, ExtractionError> {
    let (source, candidate) = locate_json(text).ok_or(ExtractionError::NoStructuredData)?;
    debug!(
        target: "tripagent::extract",
        ?source,
        candidate_len = candidate.len(),
        "located JSON candidate"
    );
    serde_json::from_str(candidate).map_err(ExtractionError::InvalidJson)
}

/// Full extraction: locate, parse, check against the `TripPlan` schema, build.
pub fn extract_itinerary(text: &str) -> Result<TripPlan, ExtractionError> {
    let value = extract_json_value(text)?;
    let schema = TripPlan::schema();

    validate_against_schema(schema, &value).map_err(schema_mismatch)?;
    deserialize_structured_response::<TripPlan>(&value, schema).map_err(schema_mismatch)
}

fn schema_mismatch(err: AgentError) -> ExtractionError {
    match err {
        AgentError::Validation(message) => ExtractionError::SchemaMismatch(message),
        other => ExtractionError::SchemaMismatch(other.to_string()),
    }
}
