//! # ollama-tutor
//!
//! A small client for a locally hosted Ollama server, plus the prompt helpers
//! of an algebra tutor built on it.
//!
//! [`CompletionClient::generate`] sends one prompt and always returns a
//! [`GenerationResult`]: the full text on success, an error descriptor on
//! failure. With `stream` enabled, every fragment is also handed to an
//! optional callback as soon as it is decoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ollama_tutor::{CompletionClient, GenerationRequest, OllamaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CompletionClient::new(OllamaConfig::new())?;
//!
//!     let request = GenerationRequest::builder()
//!         .model("llama3")
//!         .prompt("Explique o conceito de frações para um estudante de nível fácil.")
//!         .build()?;
//!
//!     let mut print = |chunk: &ollama_tutor::GenerationChunk| print!("{}", chunk.text);
//!     let result = client.generate(request, Some(&mut print)).await;
//!
//!     if let Some(error) = result.error {
//!         eprintln!("{error}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! Streamed bodies are newline-delimited JSON. Bytes are buffered until a line
//! is complete, so an object split across network reads is still decoded.
//! Blank or malformed lines are skipped without ending the stream.

pub mod completions;
pub mod core;
pub mod provider;
pub mod tutor;

pub use crate::completions::{CompletionClient, LineDecoder};
pub use crate::core::{
    ChunkSink, ErrorKind, GenerationChunk, GenerationConfig, GenerationError, GenerationRequest,
    GenerationResult, HttpClientConfig, InspectorConfig, LanguageModelUsage, LlmError,
    RequestBuilder, TextGenerator,
};
pub use provider::OllamaConfig;
pub use tutor::{Tutor, TutorAction, TutorSession};
