//! Client for the local text-generation endpoint.
//!
//! One call, one HTTP exchange. Batched responses are parsed as a single JSON
//! document; streamed responses are framed by [`LineDecoder`] and decoded one
//! object per line.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt, pin_mut};
use tracing::{debug, warn};

use crate::completions::decoder::LineDecoder;
use crate::core::{
    ChunkSink, GenerationChunk, GenerationRequest, GenerationResult, HttpClient, LlmError,
    TextGenerator,
};
use crate::provider::OllamaConfig;
use crate::provider::ollama::{GenerateRequestBody, GenerateResponseBody, GenerateStreamLine};

/// Stateless client: it holds configuration and a connection pool handle only,
/// so one instance can serve concurrent calls from several tasks.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    config: OllamaConfig,
    http: HttpClient,
    url: String,
}

impl CompletionClient {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let http = HttpClient::new(
            &config.http_config,
            config.user_agent.as_deref(),
            config.inspector_config.clone(),
        )?;
        let url = config.generate_url();

        Ok(Self { config, http, url })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Run one generation call and normalize the outcome to a single string.
    ///
    /// When `request.stream` is set, `on_chunk` receives every decoded
    /// fragment in arrival order; otherwise it is never called. Failures never
    /// escape as `Err`: they are reported through [`GenerationResult::error`].
    #[tracing::instrument(
        name = "generate",
        skip(self, request, on_chunk),
        fields(model = %request.model, stream = request.stream)
    )]
    pub async fn generate(
        &self,
        request: GenerationRequest,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Rejected invalid request");
            return GenerationResult::failure(String::new(), e);
        }

        debug!("Request in flight");
        let result = if request.stream {
            self.generate_streamed(request, on_chunk).await
        } else {
            match self.generate_batched(&request).await {
                Ok(result) => result,
                Err(e) => GenerationResult::failure(String::new(), e),
            }
        };

        match &result.error {
            None => debug!(chars = result.text.chars().count(), "Request completed"),
            Some(error) => warn!(kind = %error.kind, error = %error.message, "Request failed"),
        }
        result
    }

    /// Streamed fragments as a pull-based stream.
    ///
    /// The request is sent when the stream is first polled, with `stream`
    /// forced on. Malformed lines are skipped; the stream ends with an error
    /// item on transport failure or when the server reports an error object.
    pub fn stream(
        &self,
        mut request: GenerationRequest,
    ) -> impl Stream<Item = Result<GenerationChunk, LlmError>> + Send + '_ {
        request.stream = true;
        self.stream_lines(request).map(|line| {
            line.map(|line| GenerationChunk {
                text: line.response,
                is_final: line.done,
            })
        })
    }

    async fn generate_batched(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, LlmError> {
        let body = GenerateRequestBody::from(request);
        let value: serde_json::Value = self
            .http
            .post_json(&self.url, &self.config.extra_headers, &body)
            .await?;

        if let Some(message) = server_error(&value) {
            return Err(server_error_to_llm(message));
        }

        let res: GenerateResponseBody = serde_json::from_value(value).map_err(|e| {
            LlmError::Parse {
                message: "Response object has no text".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(GenerationResult::success(res.response, res.stats.usage()))
    }

    async fn generate_streamed(
        &self,
        request: GenerationRequest,
        mut on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        let lines = self.stream_lines(request);
        pin_mut!(lines);

        let mut text = String::new();
        let mut usage = None;
        let mut fragments = 0usize;

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => return GenerationResult::failure(text, e),
            };

            if line.done {
                usage = line.stats.usage();
            }
            let chunk = GenerationChunk {
                text: line.response,
                is_final: line.done,
            };

            text.push_str(&chunk.text);
            fragments += 1;
            if let Some(sink) = on_chunk.as_deref_mut() {
                sink(&chunk);
            }
        }

        debug!(fragments, "Stream ended");
        GenerationResult::success(text, usage)
    }

    fn stream_lines(
        &self,
        request: GenerationRequest,
    ) -> impl Stream<Item = Result<GenerateStreamLine, LlmError>> + Send + '_ {
        try_stream! {
            request.validate()?;

            let body = GenerateRequestBody::from(&request);
            let response = self
                .http
                .post_stream(&self.url, &self.config.extra_headers, &body)
                .await?;

            let mut reads = response.bytes_stream();
            let mut decoder = LineDecoder::new();

            while let Some(read) = reads.next().await {
                let read = read.map_err(|e| LlmError::Network {
                    message: "Failed to read response stream".to_string(),
                    source: Box::new(e),
                })?;

                for line in decoder.push(&read) {
                    if let Some(decoded) = self.decode_line(&line)? {
                        yield decoded;
                    }
                }
            }

            if let Some(line) = decoder.finish() {
                if let Some(decoded) = self.decode_line(&line)? {
                    yield decoded;
                }
            }
        }
    }

    /// Decode one framed line.
    ///
    /// Blank and malformed lines yield `Ok(None)`; only an object carrying an
    /// `error` field ends the stream.
    fn decode_line(&self, line: &[u8]) -> Result<Option<GenerateStreamLine>, LlmError> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return Ok(None);
        }

        let value: serde_json::Value = match serde_json::from_slice(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, bytes = line.len(), "Skipping malformed stream line");
                return Ok(None);
            }
        };
        self.http.inspector().inspect_response(&value);

        let mut decoded = match serde_json::from_value::<GenerateStreamLine>(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "Skipping stream line with unexpected shape");
                return Ok(None);
            }
        };

        if let Some(message) = decoded.error.take() {
            return Err(server_error_to_llm(&message));
        }
        Ok(Some(decoded))
    }
}

#[async_trait]
impl TextGenerator for CompletionClient {
    async fn generate(
        &self,
        request: GenerationRequest,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        CompletionClient::generate(self, request, on_chunk).await
    }
}

fn server_error(value: &serde_json::Value) -> Option<&str> {
    value.get("error").and_then(|e| e.as_str())
}

fn server_error_to_llm(message: &str) -> LlmError {
    LlmError::Api {
        message: format!("Server reported an error: {message}"),
        status_code: None,
        source: None,
    }
}
