use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlamaRateError {
    #[error("Failed to read prompt file {}: {source}", .path.display())]
    PromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt set is empty - expected a non-empty \"prompt\" list")]
    EmptyPromptSet,

    #[error("Ollama error: {0}")]
    OllamaError(String),

    #[error("Stream ended before a done response was received")]
    StreamEnded,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LlamaRateError>;
