//! Shared HTTP transport for the generation endpoint.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::builder::InspectorConfig;
use super::error::LlmError;

/// Timeouts applied to every exchange.
///
/// Generation can legitimately run for minutes, so there is no total deadline
/// by default. A stalled server is caught by `read_timeout`, which restarts on
/// every successful read.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Total time allowed for one exchange, streamed body included
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two reads
    pub read_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Thin wrapper around `reqwest::Client`.
///
/// Every request is sent exactly once. There is no retry: a failed exchange
/// is reported to the caller as-is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    inspector_config: InspectorConfig,
}

impl HttpClient {
    pub fn new(
        config: &HttpClientConfig,
        user_agent: Option<&str>,
        inspector_config: Option<InspectorConfig>,
    ) -> Result<Self, LlmError> {
        let default_ua = format!("ollama-tutor/{}", env!("CARGO_PKG_VERSION"));
        let ua = user_agent.unwrap_or(&default_ua);

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(ua);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(read_timeout) = config.read_timeout {
            builder = builder.read_timeout(read_timeout);
        }

        let client = builder.build().map_err(|e| {
            LlmError::ProviderConfiguration(format!("Failed to build reqwest client: {e}"))
        })?;

        Ok(Self {
            client,
            inspector_config: inspector_config.unwrap_or_default(),
        })
    }

    pub(crate) fn inspector(&self) -> &InspectorConfig {
        &self.inspector_config
    }

    /// POST a JSON body and parse the whole response body as one JSON document.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let res = self.send(url, headers, body).await?;

        let response_text = res.text().await.map_err(|e| LlmError::Network {
            message: "Failed to read response body".to_string(),
            source: Box::new(e),
        })?;

        let response_value: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| LlmError::Parse {
                message: "Failed to parse response as JSON".to_string(),
                source: Box::new(e),
            })?;

        self.inspector_config.inspect_response(&response_value);

        serde_json::from_value(response_value).map_err(|e| LlmError::Parse {
            message: "Failed to parse API response".to_string(),
            source: Box::new(e),
        })
    }

    /// POST a JSON body and hand back the response once its status is known
    /// to be successful, so the caller can read the body incrementally.
    #[tracing::instrument(
        name = "http_post_stream",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_stream<Req>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<reqwest::Response, LlmError>
    where
        Req: Serialize,
    {
        self.send(url, headers, body).await
    }

    async fn send<Req: Serialize>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<reqwest::Response, LlmError> {
        let body_value = serde_json::to_value(body).map_err(|e| LlmError::Parse {
            message: "Failed to serialize request body".to_string(),
            source: Box::new(e),
        })?;

        self.inspector_config.inspect_request(&body_value);

        let mut req_builder = self.client.post(url).json(&body_value);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        let res = req_builder.send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            LlmError::Network {
                message: describe_send_error(&e),
                source: Box::new(e),
            }
        })?;

        let status = res.status();
        if status.is_success() {
            debug!(status = %status, "HTTP request successful");
            return Ok(res);
        }

        warn!(status = %status, "Server returned error status");
        let error_text = res
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let error_value = serde_json::from_str(&error_text).unwrap_or_else(|_| {
            serde_json::json!({
                "error": error_text,
                "status_code": status.as_u16()
            })
        });
        self.inspector_config.inspect_response(&error_value);

        let detail = error_value
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or(&error_text);

        Err(LlmError::Api {
            message: format!("Server returned {status}: {detail}"),
            status_code: Some(status.as_u16()),
            source: None,
        })
    }
}

fn describe_send_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Could not connect to the generation server".to_string()
    } else {
        "Request failed".to_string()
    }
}
