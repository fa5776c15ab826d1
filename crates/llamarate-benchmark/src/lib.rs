pub mod ollama;
pub mod runner;

pub use ollama::{
    decode_stream, GenerateClient, GenerateOptions, GenerateRequest, GenerateResponse,
    GenerateStream, NdjsonDecoder, OllamaClient,
};
pub use runner::BenchmarkRunner;
