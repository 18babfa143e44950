//! Prompt text for the four pipeline agents.

use crate::types::TripRequest;

/// Written into the planner prompt when the request lists no preferences
pub const NO_PREFERENCES: &str = "none";

pub const ATTRACTION_SYSTEM_PROMPT: &str = "You are an attraction search assistant. \
Use the map tools to find real points of interest in the requested city. \
For each attraction report its name, address, coordinates (longitude, latitude), \
a short description and a suggested visit duration.";

pub const HOTEL_SYSTEM_PROMPT: &str = "You are a hotel search assistant. \
Use the map tools to find real hotels in the requested city matching the requested tier. \
For each hotel report its name, address, coordinates (longitude, latitude), \
price range and rating when available.";

pub const WEATHER_SYSTEM_PROMPT: &str = "You are a weather assistant. \
Use the map tools to look up the forecast for the requested city. \
Report one entry per date with day and night conditions, temperatures and wind.";

pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are a trip planning expert. Combine the attraction, hotel and weather information you are given into a day-by-day itinerary.

Answer with a single JSON object of this shape:
```json
{
  "city": "city name",
  "start_date": "YYYY-MM-DD",
  "end_date": "YYYY-MM-DD",
  "days": [
    {
      "date": "YYYY-MM-DD",
      "day_index": 0,
      "description": "summary of the day",
      "transportation": "how to get around",
      "accommodation": "lodging tier",
      "hotel": {"name": "hotel name", "address": "address", "location": {"longitude": 120.15, "latitude": 30.28}, "price_range": "300-500", "rating": "4.5", "distance": "near the first stop", "hotel_type": "budget", "estimated_cost": 400},
      "attractions": [
        {"name": "attraction name", "address": "address", "location": {"longitude": 120.15, "latitude": 30.25}, "visit_duration": 120, "description": "why go", "category": "history", "ticket_price": 0}
      ],
      "meals": [
        {"type": "breakfast", "name": "meal suggestion", "description": "what to eat", "estimated_cost": 30}
      ]
    }
  ],
  "weather_info": [
    {"date": "YYYY-MM-DD", "day_weather": "sunny", "night_weather": "cloudy", "day_temp": 25, "night_temp": 15, "wind_direction": "south", "wind_power": "1-3"}
  ],
  "overall_suggestions": "general advice",
  "budget": {"total_attractions": 0, "total_hotels": 0, "total_meals": 0, "total_transportation": 0, "total": 0}
}
```"#;

/// Attraction search keyed by city and preference tags.
pub fn attraction_query(request: &TripRequest) -> String {
    let topic = if request.preferences.is_empty() {
        "popular".to_string()
    } else {
        request.preferences.join(" and ")
    };
    format!("Search for {} attractions in {}.\n", topic, request.city)
}

pub fn hotel_query(request: &TripRequest) -> String {
    format!(
        "Search for {} hotels in {}.\n",
        request.accommodation, request.city
    )
}

pub fn weather_query(request: &TripRequest) -> String {
    format!(
        "Look up the weather in {} from {} to {}.\n",
        request.city, request.start_date, request.end_date
    )
}

/// Composite planner prompt built from the request and the three upstream texts.
pub fn planner_query(
    request: &TripRequest,
    attraction: &str,
    weather: &str,
    hotel: &str,
) -> String {
    let preferences = if request.preferences.is_empty() {
        NO_PREFERENCES.to_string()
    } else {
        request.preferences.join(", ")
    };

    let mut query = format!(
        "\nCreate a {days}-day travel plan for {city} from the information below.\n\
**Basic information:**\n\
- City: {city}\n\
- Dates: {start} to {end}\n\
- Days: {days}\n\
- Transportation: {transportation}\n\
- Accommodation: {accommodation}\n\
- Preferences: {preferences}\n\
\n\
**Attractions:**\n\
{attraction}\n\
\n\
**Weather:**\n\
{weather}\n\
\n\
**Hotels:**\n\
{hotel}\n\
\n\
**Requirements:**\n\
1. Schedule 2-3 attractions per day\n\
2. Include breakfast, lunch and dinner every day\n\
3. Recommend one specific hotel per day, chosen from the hotel information\n\
4. Take the distance between stops and the transportation mode into account\n\
5. Return the complete plan as JSON\n\
6. Attraction coordinates must be real and accurate\n",
        days = request.travel_days,
        city = request.city,
        start = request.start_date,
        end = request.end_date,
        transportation = request.transportation,
        accommodation = request.accommodation,
    );

    if let Some(extra) = request.extra_instructions() {
        query.push_str(&format!("\n**Additional requirements:** {}", extra));
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(preferences: &[&str]) -> TripRequest {
        TripRequest {
            city: "Beijing".to_string(),
            start_date: "2026-01-19".to_string(),
            end_date: "2026-01-21".to_string(),
            travel_days: 3,
            transportation: "public transit".to_string(),
            accommodation: "budget hotel".to_string(),
            preferences: preferences.iter().map(|p| p.to_string()).collect(),
            free_text_input: None,
        }
    }

    #[test]
    fn test_attraction_query_uses_preferences() {
        assert_eq!(
            attraction_query(&request(&["history", "food"])),
            "Search for history and food attractions in Beijing.\n"
        );
        assert_eq!(
            attraction_query(&request(&[])),
            "Search for popular attractions in Beijing.\n"
        );
    }

    #[test]
    fn test_hotel_and_weather_queries() {
        let req = request(&[]);
        assert!(hotel_query(&req).contains("budget hotel hotels in Beijing"));
        assert!(weather_query(&req).contains("from 2026-01-19 to 2026-01-21"));
    }

    #[test]
    fn test_planner_query_sections() {
        let req = request(&["history", "food"]);
        let query = planner_query(&req, "Forbidden City", "sunny", "Hutong Inn");

        assert!(query.contains("- Preferences: history, food\n"));
        assert!(query.contains("**Attractions:**\nForbidden City\n"));
        assert!(query.contains("**Weather:**\nsunny\n"));
        assert!(query.contains("**Hotels:**\nHutong Inn\n"));
        assert!(query.contains("- Days: 3\n"));
        assert!(!query.contains("Additional requirements"));
    }

    #[test]
    fn test_planner_query_marks_missing_preferences() {
        let query = planner_query(&request(&[]), "a", "b", "c");
        assert!(query.contains(&format!("- Preferences: {}\n", NO_PREFERENCES)));
    }

    #[test]
    fn test_planner_query_appends_extra_instructions() {
        let mut req = request(&[]);
        req.free_text_input = Some("more museums please".to_string());

        let query = planner_query(&req, "a", "b", "c");
        assert!(query.ends_with("\n**Additional requirements:** more museums please"));

        req.free_text_input = Some("   ".to_string());
        assert!(!planner_query(&req, "a", "b", "c").contains("Additional requirements"));
    }
}
