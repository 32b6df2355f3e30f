//! Text generation against the local Ollama endpoint.

pub mod client;
pub mod decoder;

pub use client::CompletionClient;
pub use decoder::LineDecoder;
