#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use trip_agent_rs::{
    AgentError, AgentResponse, AgentStep, ChatModel, ConversationAgent, Result, RunResult,
    TripPipeline, TripRequest,
};

/// `(agent name, user turn)` in call order, shared by every fake in a test
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

pub enum Reply {
    Text(String),
    Messages(Vec<&'static str>),
    Fail(&'static str),
    Delayed(Duration, String),
}

pub struct ScriptedAgent {
    name: String,
    reply: Reply,
    log: CallLog,
}

impl ScriptedAgent {
    pub fn new(name: &str, reply: Reply, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply,
            log: Arc::clone(log),
        })
    }

    pub fn text(name: &str, text: &str, log: &CallLog) -> Arc<Self> {
        Self::new(name, Reply::Text(text.to_string()), log)
    }
}

#[async_trait]
impl ConversationAgent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, user_turn: &str) -> Result<AgentResponse> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), user_turn.to_string()));

        match &self.reply {
            Reply::Text(text) => Ok(AgentResponse::Opaque(Value::String(text.clone()))),
            Reply::Messages(messages) => {
                let mut steps = vec![AgentStep::Task {
                    content: user_turn.to_string(),
                }];
                steps.extend(messages.iter().map(|m| AgentStep::assistant_text(*m)));
                Ok(AgentResponse::Messages(RunResult::new(
                    steps,
                    None,
                    Duration::ZERO,
                    1,
                )))
            }
            Reply::Fail(message) => Err(AgentError::Provider(message.to_string())),
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(AgentResponse::Opaque(Value::String(text.clone())))
            }
        }
    }
}

/// Chat model that replays canned completions and records every request body.
#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<Value>>,
    pub requests: Mutex<Vec<Value>>,
}

impl ScriptedChatModel {
    pub fn new(replies: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat_completion(&self, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::Provider("script exhausted".to_string()))
    }
}

pub fn completion(content: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

pub fn tool_call_completion(id: &str, name: &str, arguments: Value) -> Value {
    json!({
        "choices": [{"message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments.to_string()}
            }]
        }}]
    })
}

pub fn request(preferences: &[&str]) -> TripRequest {
    TripRequest {
        city: "Hangzhou".to_string(),
        start_date: "2026-04-01".to_string(),
        end_date: "2026-04-03".to_string(),
        travel_days: 3,
        transportation: "public transit".to_string(),
        accommodation: "budget hotel".to_string(),
        preferences: preferences.iter().map(|p| p.to_string()).collect(),
        free_text_input: None,
    }
}

pub const PLAN_JSON: &str = r#"{
  "city": "Hangzhou",
  "start_date": "2026-04-01",
  "end_date": "2026-04-03",
  "days": [
    {
      "date": "2026-04-01",
      "day_index": 0,
      "description": "Lakeside day",
      "hotel": {"name": "Lakeview Hostel", "address": "1 Beishan Rd"},
      "attractions": [
        {"name": "West Lake", "location": {"longitude": 120.14, "latitude": 30.24}},
        {"name": "Leifeng Pagoda", "location": {"longitude": 120.15, "latitude": 30.23}}
      ],
      "meals": [
        {"type": "breakfast", "name": "Congee"},
        {"type": "lunch", "name": "Dongpo pork"},
        {"type": "dinner", "name": "West Lake fish"}
      ]
    }
  ],
  "weather_info": [
    {"date": "2026-04-01", "day_weather": "sunny", "day_temp": 22, "night_temp": "14°C"}
  ],
  "overall_suggestions": "Bring walking shoes."
}"#;

pub fn planner_reply() -> String {
    format!("Here is your plan:\n```json\n{PLAN_JSON}\n```\nHave a great trip!")
}

/// Pipeline of scripted agents with the given planner reply
pub fn scripted_pipeline(planner: Reply, log: &CallLog) -> TripPipeline {
    TripPipeline::builder()
        .attraction_agent(ScriptedAgent::text("attraction_agent", "West Lake; Leifeng Pagoda", log))
        .hotel_agent(ScriptedAgent::text("hotel_agent", "Lakeview Hostel", log))
        .weather_agent(ScriptedAgent::text("weather_agent", "Sunny, 22°C", log))
        .planner_agent(ScriptedAgent::new("planner_agent", planner, log))
        .build()
        .unwrap()
}
