pub mod response;
pub mod result;
pub mod trip;

pub use response::{deserialize_structured_response, AgentResponse};
pub use result::{RunResult, TokenUsage};
pub use trip::{
    Attraction, Budget, DayPlan, Hotel, Location, Meal, Temperature, TripPlan, TripRequest,
    WeatherInfo,
};
