use thiserror::Error;

pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request builder error: {0}")]
    Builder(String),

    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxedSource,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxedSource,
    },
}

/// Coarse classification reported to callers of
/// [`CompletionClient::generate`](crate::CompletionClient::generate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure, timeout, non-2xx status or a server-reported error.
    Transport,
    /// The body was not the JSON document that was expected.
    Decode,
    /// The request violated one of its invariants and was never sent.
    InvalidRequest,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::InvalidRequest => write!(f, "invalid request"),
        }
    }
}

impl LlmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Network { .. } | LlmError::Api { .. } => ErrorKind::Transport,
            LlmError::Parse { .. } => ErrorKind::Decode,
            LlmError::Builder(_) => ErrorKind::InvalidRequest,
            // The HTTP client could not be built, so nothing could be sent.
            LlmError::ProviderConfiguration(_) => ErrorKind::Transport,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Error descriptor carried inside a [`GenerationResult`](crate::GenerationResult).
///
/// Unlike [`LlmError`] this is a plain value: it can be cloned, compared and
/// shown to a user without holding on to the underlying source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GenerationError {}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        let kind = err.kind();
        let status_code = err.status_code();

        // Flatten the source chain so the description names the root cause
        // (e.g. "connection refused") and not only the outer context.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            kind,
            message,
            status_code,
        }
    }
}
