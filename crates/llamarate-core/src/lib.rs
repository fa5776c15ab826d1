pub mod benchmark_mode;
pub mod config;
pub mod error;
pub mod metrics;
pub mod prompt;
pub mod stats;
pub mod timing;

pub use benchmark_mode::BenchmarkMode;
pub use config::{BenchmarkConfig, OllamaConfig, OLLAMA_HOST_ENV};
pub use error::{LlamaRateError, Result};
pub use metrics::GenerateMetrics;
pub use prompt::PromptSet;
pub use stats::{write_report, RateSummary};
pub use timing::TimingAccumulator;
