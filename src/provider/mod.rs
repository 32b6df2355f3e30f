pub(crate) mod constants;
pub(crate) mod ollama;

pub use ollama::OllamaConfig;
