//! trip-agent-rs: multi-agent trip itinerary planning
//!
//! Three tool-calling agents search attractions, hotels and weather for a
//! destination; a planner agent folds their findings into a day-by-day
//! itinerary, which is parsed into a typed [`TripPlan`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_agent_rs::{Settings, TripPipeline, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let (pipeline, toolset) = TripPipeline::launch(&settings).await?;
//!
//!     let request = TripRequest {
//!         city: "Hangzhou".to_string(),
//!         start_date: "2026-04-01".to_string(),
//!         end_date: "2026-04-03".to_string(),
//!         travel_days: 3,
//!         transportation: "public transit".to_string(),
//!         accommodation: "budget hotel".to_string(),
//!         preferences: vec!["history".to_string()],
//!         free_text_input: None,
//!     };
//!
//!     let plan = pipeline.plan_trip(request).await?.into_itinerary()?;
//!     println!("{}", serde_json::to_string_pretty(&plan)?);
//!
//!     drop(pipeline);
//!     toolset.shutdown().await;
//!     Ok(())
//! }
//! ```

extern crate self as trip_agent_rs;

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod schemas;
pub mod services;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "server")]
pub mod server;

pub use config::Settings;
pub use core::{Agent, AgentMemory, AgentStep, ConversationAgent, RunResult, TokenUsage, ToolCall};
pub use error::{AgentError, ExtractionError, Result};
pub use pipeline::{
    extract_itinerary, extract_json_value, PlanOutcome, PlanState, PlannerStage, QueryStage,
    Stage, StageField, StateUpdate, TripPipeline, TripPipelineBuilder,
};
pub use schemas::{CompletionSchema, SchemaHandle};
pub use services::openai_client::{ChatCompletionRequest, ChatModel, OpenAIClient};
pub use tools::{FunctionFactory, McpServerConfig, McpTool, McpToolset, Tool, ToolFuture};
pub use tripagent_macros::completion_schema;
pub use types::{AgentResponse, TripPlan, TripRequest};

pub use core as agent;
pub use schemas as schema;
