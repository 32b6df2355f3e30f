pub mod ollama {
    pub const DEFAULT_MODEL: &str = "llama3";
    pub const API_BASE: &str = "http://localhost:11434";
    pub const GENERATE_ENDPOINT: &str = "/api/generate";
    pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";
    pub const MODEL_ENV_VAR: &str = "OLLAMA_MODEL";
}
