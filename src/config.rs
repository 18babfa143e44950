//! Service settings read from the environment.
//!
//! `.env` loading happens at the binary edge (`dotenvy`); this module only
//! reads variables, so tests can feed it a plain map through
//! [`Settings::from_lookup`].

use std::{env, str::FromStr, time::Duration};

use serde::Serialize;
use tracing::info;

use crate::{
    error::{AgentError, Result},
    tools::McpServerConfig,
};

const DEFAULT_APP_NAME: &str = "trip-agent";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const DEFAULT_MCP_SERVER: &str = "amap-mcp-server";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: String,

    #[serde(skip_serializing)]
    pub amap_api_key: String,
    pub mcp_command: String,
    pub mcp_args: Vec<String>,

    #[serde(skip_serializing)]
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model_id: String,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: Option<u32>,
    pub agent_max_iterations: usize,
    pub stage_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.to_string(),
            amap_api_key: String::new(),
            mcp_command: "uvx".to_string(),
            mcp_args: vec![DEFAULT_MCP_SERVER.to_string()],
            llm_api_key: String::new(),
            llm_base_url: String::new(),
            llm_model_id: String::new(),
            llm_timeout_secs: 120,
            llm_max_tokens: None,
            agent_max_iterations: 10,
            stage_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let mcp_args = match get("MCP_ARGS") {
            Some(args) => args.split_whitespace().map(str::to_string).collect(),
            None => defaults.mcp_args,
        };

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            app_version: defaults.app_version,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            cors_origins: get("CORS_ORIGINS").unwrap_or(defaults.cors_origins),
            amap_api_key: get("AMAP_MAPS_API_KEY")
                .or_else(|| get("AMAP_API_KEY"))
                .unwrap_or_default(),
            mcp_command: get("MCP_COMMAND").unwrap_or(defaults.mcp_command),
            mcp_args,
            llm_api_key: get("LLM_API_KEY")
                .or_else(|| get("OPENAI_API_KEY"))
                .unwrap_or_default(),
            llm_base_url: get("LLM_BASE_URL")
                .or_else(|| get("OPENAI_BASE_URL"))
                .unwrap_or_default(),
            llm_model_id: get("LLM_MODEL_ID").unwrap_or_default(),
            llm_timeout_secs: parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                defaults.llm_timeout_secs,
            )?,
            llm_max_tokens: parse_opt("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"))?,
            agent_max_iterations: parse_or(
                "AGENT_MAX_ITERATIONS",
                get("AGENT_MAX_ITERATIONS"),
                defaults.agent_max_iterations,
            )?,
            stage_timeout_secs: parse_opt("STAGE_TIMEOUT_SECS", get("STAGE_TIMEOUT_SECS"))?,
        })
    }

    pub fn with_llm(
        mut self,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        self.llm_api_key = api_key.into();
        self.llm_base_url = base_url.into();
        self.llm_model_id = model_id.into();
        self
    }

    pub fn with_amap_api_key(mut self, key: impl Into<String>) -> Self {
        self.amap_api_key = key.into();
        self
    }

    pub fn with_stage_timeout(mut self, secs: Option<u64>) -> Self {
        self.stage_timeout_secs = secs;
        self
    }

    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Problems found in the settings, as `(errors, warnings)`.
    ///
    /// Errors prevent the service from planning trips at all.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.amap_api_key.is_empty() {
            errors.push("AMAP_MAPS_API_KEY is not set");
        }
        if self.llm_api_key.is_empty() {
            errors.push("LLM_API_KEY (or OPENAI_API_KEY) is not set");
        }
        if self.llm_base_url.is_empty() {
            errors.push("LLM_BASE_URL (or OPENAI_BASE_URL) is not set");
        }
        if self.llm_model_id.is_empty() {
            errors.push("LLM_MODEL_ID is not set");
        }

        match self.stage_timeout_secs {
            None => warnings.push("STAGE_TIMEOUT_SECS is not set; stages may run indefinitely"),
            Some(0) => errors.push("STAGE_TIMEOUT_SECS is 0; every stage would time out"),
            Some(_) => {}
        }
        if self.agent_max_iterations == 0 {
            warnings.push("AGENT_MAX_ITERATIONS is 0; every agent turn will fail");
        }
        if self.cors_origins_list().is_empty() {
            warnings.push("CORS_ORIGINS is empty; browsers on other origins are rejected");
        }

        let owned = |messages: Vec<&str>| -> Vec<String> {
            messages.into_iter().map(str::to_string).collect()
        };
        (owned(errors), owned(warnings))
    }

    /// Fail with every validation error joined, if there are any.
    pub fn ensure_valid(&self) -> Result<()> {
        let (errors, _) = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgentError::Config(errors.join("; ")))
        }
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs.map(Duration::from_secs)
    }

    /// Launch configuration for the map toolset server
    pub fn mcp_server(&self) -> McpServerConfig {
        McpServerConfig::new(DEFAULT_MCP_SERVER, self.mcp_command.clone())
            .with_args(self.mcp_args.iter().cloned())
            .with_env("AMAP_MAPS_API_KEY", self.amap_api_key.clone())
    }

    /// Log the effective settings with secrets reduced to presence.
    pub fn log_summary(&self) {
        info!(
            target: "tripagent::config",
            app = %self.app_name,
            version = %self.app_version,
            host = %self.host,
            port = self.port,
            log_level = %self.log_level,
            amap_api_key = presence(&self.amap_api_key),
            llm_api_key = presence(&self.llm_api_key),
            llm_base_url = %self.llm_base_url,
            llm_model = %self.llm_model_id,
            "settings loaded"
        );

        let (errors, warnings) = self.validate();
        for warning in &warnings {
            tracing::warn!(target: "tripagent::config", "{}", warning);
        }
        for error in &errors {
            tracing::error!(target: "tripagent::config", "{}", error);
        }
    }
}

fn presence(secret: &str) -> &'static str {
    if secret.is_empty() {
        "missing"
    } else {
        "configured"
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    Ok(parse_opt(key, raw)?.unwrap_or(default))
}

fn parse_opt<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| AgentError::Config(format!("{} has an invalid value: {}", key, value)))
    })
    .transpose()
}
