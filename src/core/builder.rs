use std::marker::PhantomData;
use std::sync::Arc;

use super::{
    error::LlmError,
    types::{GenerationConfig, GenerationRequest},
};

pub struct Init;
pub struct ModelSet;
pub struct PromptSet;

/// Typestate builder for [`GenerationRequest`].
///
/// `model` and `prompt` have to be supplied, in that order, before `build`
/// becomes available. Sampling parameters start from
/// [`GenerationConfig::default`].
pub struct RequestBuilder<State> {
    model: Option<String>,
    prompt: Option<String>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
    _state: PhantomData<State>,
}

impl<State> RequestBuilder<State> {
    fn transition<Next>(self) -> RequestBuilder<Next> {
        RequestBuilder {
            model: self.model,
            prompt: self.prompt,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stream: self.stream,
            _state: PhantomData,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

impl RequestBuilder<Init> {
    pub fn model(mut self, model: impl Into<String>) -> RequestBuilder<ModelSet> {
        self.model = Some(model.into());
        self.transition()
    }
}

impl RequestBuilder<ModelSet> {
    pub fn prompt(mut self, prompt: impl Into<String>) -> RequestBuilder<PromptSet> {
        self.prompt = Some(prompt.into());
        self.transition()
    }
}

impl RequestBuilder<PromptSet> {
    pub fn build(self) -> Result<GenerationRequest, LlmError> {
        let model = self.model.ok_or(LlmError::Builder(
            "Missing model. Make sure to specify a model.".to_string(),
        ))?;
        let prompt = self.prompt.ok_or(LlmError::Builder(
            "Missing prompt. Make sure to add a prompt.".to_string(),
        ))?;

        let request = GenerationRequest {
            model,
            prompt,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stream: self.stream,
        };
        request.validate()?;
        Ok(request)
    }
}

impl GenerationRequest {
    pub fn builder() -> RequestBuilder<Init> {
        let defaults = GenerationConfig::default();
        RequestBuilder {
            model: None,
            prompt: None,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            max_tokens: defaults.max_tokens,
            stream: defaults.stream,
            _state: PhantomData,
        }
    }
}

pub type Inspector = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Hooks for observing raw JSON traffic.
///
/// The request inspector sees every outgoing body. The response inspector sees
/// every decoded response object: once for a batched call, once per line for
/// a streamed one.
#[derive(Clone, Default)]
pub struct InspectorConfig {
    pub request_inspector: Option<Inspector>,
    pub response_inspector: Option<Inspector>,
}

impl InspectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_inspector(
        mut self,
        inspector: impl Fn(&serde_json::Value) + Send + Sync + 'static,
    ) -> Self {
        self.request_inspector = Some(Arc::new(inspector));
        self
    }

    pub fn with_response_inspector(
        mut self,
        inspector: impl Fn(&serde_json::Value) + Send + Sync + 'static,
    ) -> Self {
        self.response_inspector = Some(Arc::new(inspector));
        self
    }

    pub(crate) fn inspect_request(&self, body: &serde_json::Value) {
        if let Some(ref inspector) = self.request_inspector {
            inspector(body);
        }
    }

    pub(crate) fn inspect_response(&self, body: &serde_json::Value) {
        if let Some(ref inspector) = self.response_inspector {
            inspector(body);
        }
    }
}

impl std::fmt::Debug for InspectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorConfig")
            .field("request_inspector", &self.request_inspector.is_some())
            .field("response_inspector", &self.response_inspector.is_some())
            .finish()
    }
}
