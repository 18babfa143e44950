//! Four-stage trip planning pipeline.
//!
//! Attraction, hotel and weather agents run first, each writing its own
//! slot of the [`PlanState`]. The planner agent then sees all three texts
//! and its reply is parsed into a [`TripPlan`](crate::types::TripPlan).

pub mod controller;
pub mod extract;
pub mod planner;
pub mod prompts;
pub mod stage;
pub mod state;

pub use controller::{PlanOutcome, TripPipeline, TripPipelineBuilder};
pub use extract::{extract_itinerary, extract_json_value};
pub use planner::PlannerStage;
pub use stage::{QueryBuilder, QueryStage, Stage};
pub use state::{PlanState, StageField, StateUpdate};
