use crate::core::error::{GenerationError, LlmError};
use crate::provider::constants::ollama;

/// Generation parameters shared by every request of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,

    /// Sampling temperature (0.0 to 1.0)
    pub temperature: f32,

    /// Nucleus sampling parameter (0.0 to 1.0)
    pub top_p: f32,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Whether the server should stream the response line by line
    pub stream: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: ollama::DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            top_p: 0.65,
            max_tokens: 200,
            stream: true,
        }
    }
}

impl GenerationConfig {
    /// Build a request for `prompt` using these parameters.
    pub fn request(&self, prompt: impl Into<String>) -> Result<GenerationRequest, LlmError> {
        let request = GenerationRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stream: self.stream,
        };
        request.validate()?;
        Ok(request)
    }
}

/// A single text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::Builder(
                "Missing model. Make sure to specify a model.".to_string(),
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(LlmError::Builder(
                "Missing prompt. The prompt must not be empty.".to_string(),
            ));
        }
        check_unit_range("temperature", self.temperature)?;
        check_unit_range("top_p", self.top_p)?;
        if self.max_tokens == 0 {
            return Err(LlmError::Builder(
                "max_tokens must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit_range(name: &str, value: f32) -> Result<(), LlmError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LlmError::Builder(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )))
    }
}

/// One incremental fragment of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationChunk {
    pub text: String,
    /// Set on the fragment decoded from the server's `done` object.
    pub is_final: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageModelUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// Wall-clock time the server spent on the request, in nanoseconds.
    pub total_duration_ns: Option<u64>,
}

/// Terminal value of a generation call, successful or not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationResult {
    pub text: String,
    pub error: Option<GenerationError>,
    pub usage: Option<LanguageModelUsage>,
}

impl GenerationResult {
    pub fn success(text: String, usage: Option<LanguageModelUsage>) -> Self {
        Self {
            text,
            error: None,
            usage,
        }
    }

    pub fn failure(text: String, error: impl Into<GenerationError>) -> Self {
        Self {
            text,
            error: Some(error.into()),
            usage: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The generated text, or the error description when the call failed.
    ///
    /// This is what an interactive caller shows in place of the answer.
    pub fn display_text(&self) -> &str {
        match &self.error {
            Some(error) => &error.message,
            None => &self.text,
        }
    }

    pub fn into_result(self) -> Result<String, GenerationError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.text),
        }
    }
}
