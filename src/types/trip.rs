use crate::{
    completion_schema,
    error::{AgentError, Result},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const MAX_TRAVEL_DAYS: u32 = 30;

/// A trip-planning request as submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    pub travel_days: u32,
    pub transportation: String,
    pub accommodation: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub free_text_input: Option<String>,
}

impl TripRequest {
    /// Shape checks applied at the HTTP boundary.
    ///
    /// The pipeline itself assumes a well-formed request.
    pub fn validate(&self) -> Result<()> {
        if self.city.trim().is_empty() {
            return Err(AgentError::Validation("city must not be empty".to_string()));
        }
        if self.start_date.trim().is_empty() || self.end_date.trim().is_empty() {
            return Err(AgentError::Validation(
                "start_date and end_date are required".to_string(),
            ));
        }
        if !(1..=MAX_TRAVEL_DAYS).contains(&self.travel_days) {
            return Err(AgentError::Validation(format!(
                "travel_days must be between 1 and {}, got {}",
                MAX_TRAVEL_DAYS, self.travel_days
            )));
        }
        Ok(())
    }

    /// Free-text instructions, if any non-blank text was supplied.
    pub fn extra_instructions(&self) -> Option<&str> {
        self.free_text_input
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Day-by-day itinerary produced by the planner agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[completion_schema(name = "TripPlan")]
pub struct TripPlan {
    /// Destination city
    pub city: String,
    /// First day of the trip (YYYY-MM-DD)
    pub start_date: String,
    /// Last day of the trip (YYYY-MM-DD)
    pub end_date: String,
    /// One entry per travel day, in order
    pub days: Vec<DayPlan>,
    /// Forecast for each day of the trip
    #[serde(default)]
    pub weather_info: Vec<WeatherInfo>,
    /// General advice for the whole trip
    #[serde(default)]
    pub overall_suggestions: String,
    /// Estimated spend by category
    #[serde(default)]
    pub budget: Option<Budget>,
}

/// One day of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayPlan {
    pub date: String,
    /// 0-based position of this day within the trip
    pub day_index: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub transportation: String,
    #[serde(default)]
    pub accommodation: String,
    /// Lodging recommended for the night, chosen from the hotel search
    #[serde(default)]
    pub hotel: Option<Hotel>,
    /// Two or three attractions in visiting order
    pub attractions: Vec<Attraction>,
    /// Breakfast, lunch and dinner
    #[serde(default)]
    pub meals: Vec<Meal>,
}

/// WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attraction {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub location: Location,
    /// Suggested visit length in minutes
    #[serde(default)]
    pub visit_duration: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ticket_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Meal {
    /// breakfast, lunch, dinner or snack
    #[serde(rename = "type")]
    pub meal_type: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hotel {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub hotel_type: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// Temperatures arrive either as numbers or as text such as `"25°C"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Temperature {
    Degrees(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherInfo {
    pub date: String,
    #[serde(default)]
    pub day_weather: String,
    #[serde(default)]
    pub night_weather: String,
    #[serde(default)]
    pub day_temp: Option<Temperature>,
    #[serde(default)]
    pub night_temp: Option<Temperature>,
    #[serde(default)]
    pub wind_direction: Option<String>,
    #[serde(default)]
    pub wind_power: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Budget {
    #[serde(default)]
    pub total_attractions: f64,
    #[serde(default)]
    pub total_hotels: f64,
    #[serde(default)]
    pub total_meals: f64,
    #[serde(default)]
    pub total_transportation: f64,
    #[serde(default)]
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CompletionSchema;

    fn request() -> TripRequest {
        TripRequest {
            city: "Hangzhou".to_string(),
            start_date: "2026-04-01".to_string(),
            end_date: "2026-04-03".to_string(),
            travel_days: 3,
            transportation: "public transit".to_string(),
            accommodation: "budget hotel".to_string(),
            preferences: vec![],
            free_text_input: None,
        }
    }

    #[test]
    fn test_request_defaults_optional_fields() {
        let parsed: TripRequest = serde_json::from_str(
            r#"{
                "city": "Hangzhou",
                "start_date": "2026-04-01",
                "end_date": "2026-04-03",
                "travel_days": 3,
                "transportation": "public transit",
                "accommodation": "budget hotel"
            }"#,
        )
        .unwrap();

        assert_eq!(parsed, request());
    }

    #[test]
    fn test_request_validation() {
        assert!(request().validate().is_ok());

        let mut blank_city = request();
        blank_city.city = "  ".to_string();
        assert!(blank_city.validate().is_err());

        let mut too_long = request();
        too_long.travel_days = 31;
        assert!(too_long.validate().is_err());

        let mut zero = request();
        zero.travel_days = 0;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_blank_extra_instructions_are_ignored() {
        let mut req = request();
        req.free_text_input = Some("   ".to_string());
        assert_eq!(req.extra_instructions(), None);

        req.free_text_input = Some(" more museums ".to_string());
        assert_eq!(req.extra_instructions(), Some("more museums"));
    }

    #[test]
    fn test_temperature_accepts_numbers_and_text() {
        let weather: WeatherInfo = serde_json::from_str(
            r#"{"date": "2026-04-01", "day_temp": 25, "night_temp": "15°C"}"#,
        )
        .unwrap();

        assert_eq!(weather.day_temp, Some(Temperature::Degrees(25.0)));
        assert_eq!(
            weather.night_temp,
            Some(Temperature::Text("15°C".to_string()))
        );
    }

    #[test]
    fn test_trip_plan_schema_requires_days() {
        let schema = TripPlan::schema().schema_json();
        let required = schema["required"].as_array().unwrap();

        assert!(required.iter().any(|field| field == "days"));
        assert!(!required.iter().any(|field| field == "budget"));
        assert_eq!(schema["title"], "TripPlan");
    }
}
