use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{LlamaRateError, Result};

/// Prompts read from a `{"prompt": [...]}` file, cycled through by run index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptSet {
    #[serde(rename = "prompt", default)]
    prompts: Vec<String>,
}

impl PromptSet {
    pub fn new(prompts: Vec<String>) -> Self {
        Self { prompts }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LlamaRateError::PromptFile {
            path: path.to_path_buf(),
            source,
        })?;
        let set: PromptSet = serde_json::from_str(&content)?;
        debug!(path = %path.display(), count = set.len(), "Loaded prompt set");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Round-robin pick for run `index`.
    pub fn select(&self, index: usize) -> Result<&str> {
        if self.prompts.is_empty() {
            return Err(LlamaRateError::EmptyPromptSet);
        }
        Ok(&self.prompts[index % self.prompts.len()])
    }
}
