pub mod builder;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use builder::{Init, Inspector, InspectorConfig, ModelSet, PromptSet, RequestBuilder};
pub use error::{ErrorKind, GenerationError, LlmError};
pub use http::{HttpClient, HttpClientConfig};
pub use traits::{ChunkSink, TextGenerator};
pub use types::{
    GenerationChunk, GenerationConfig, GenerationRequest, GenerationResult, LanguageModelUsage,
};
