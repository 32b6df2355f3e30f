//! Ollama `/api/generate` configuration and wire types.
//!
//! The request carries the sampling parameters as top-level fields, next to
//! `model`, `prompt` and `stream`. Responses are either one JSON object
//! (batched) or one JSON object per line (streamed); every object holds its
//! text in `response`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{
    GenerationConfig, GenerationRequest, HttpClientConfig, InspectorConfig, LanguageModelUsage,
};
use crate::provider::constants::ollama;

/// Where and how to reach the generation server.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub endpoint: String,
    pub http_config: HttpClientConfig,
    pub user_agent: Option<String>,
    pub extra_headers: Vec<(String, String)>,
    pub inspector_config: Option<InspectorConfig>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaConfig {
    pub fn new() -> Self {
        Self {
            base_url: ollama::API_BASE.to_string(),
            endpoint: ollama::GENERATE_ENDPOINT.to_string(),
            http_config: HttpClientConfig::default(),
            user_agent: None,
            extra_headers: Vec::new(),
            inspector_config: None,
        }
    }

    /// Default configuration with the base URL taken from `OLLAMA_HOST` when set.
    pub fn from_env() -> Self {
        let config = Self::new();
        match std::env::var(ollama::HOST_ENV_VAR) {
            Ok(host) if !host.trim().is_empty() => config.with_base_url(normalize_host(&host)),
            _ => config,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Cap the whole exchange, streamed body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    /// Fail when the server stays silent for longer than `read_timeout`.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.http_config.read_timeout = Some(read_timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_inspector(mut self, inspector_config: InspectorConfig) -> Self {
        self.inspector_config = Some(inspector_config);
        self
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

impl GenerationConfig {
    /// Default parameters with the model taken from `OLLAMA_MODEL` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(ollama::MODEL_ENV_VAR) {
            Ok(model) if !model.trim().is_empty() => Self {
                model: model.trim().to_string(),
                ..config
            },
            _ => config,
        }
    }
}

/// `OLLAMA_HOST` is commonly given as `host:port` without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl<'a> From<&'a GenerationRequest> for GenerateRequestBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            prompt: &request.prompt,
            stream: request.stream,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }
}

/// Statistics Ollama attaches to its final object.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateStats {
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    total_duration: Option<u64>,
}

impl GenerateStats {
    pub(crate) fn usage(&self) -> Option<LanguageModelUsage> {
        if self.prompt_eval_count.is_none()
            && self.eval_count.is_none()
            && self.total_duration.is_none()
        {
            return None;
        }
        let prompt_tokens = self.prompt_eval_count.unwrap_or_default();
        let completion_tokens = self.eval_count.unwrap_or_default();
        Some(LanguageModelUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
            total_duration_ns: self.total_duration,
        })
    }
}

/// Body of a batched (`stream: false`) response.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponseBody {
    pub response: String,
    #[serde(flatten)]
    pub stats: GenerateStats,
}

/// One line of a streamed response.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateStreamLine {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub stats: GenerateStats,
}
