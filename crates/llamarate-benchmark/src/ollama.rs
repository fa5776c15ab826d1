use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use llamarate_core::{GenerateMetrics, LlamaRateError, OllamaConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub type GenerateStream = Pin<Box<dyn Stream<Item = Result<GenerateResponse>> + Send>>;

/// Anything that can answer a generate request with a stream of chunks.
#[async_trait]
pub trait GenerateClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateStream>;
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Streaming request with deterministic sampling.
    pub fn new(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: true,
            options: GenerateOptions::deterministic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub seed: i64,
}

impl GenerateOptions {
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub metrics: GenerateMetrics,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: &str) -> Result<Self> {
        let host = host.trim_end_matches('/');
        reqwest::Url::parse(host)
            .map_err(|e| LlamaRateError::Config(format!("Invalid Ollama host {}: {}", host, e)))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlamaRateError::Config(e.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            client,
        })
    }

    /// Build a client from `OLLAMA_HOST`.
    pub fn from_env() -> Result<Self> {
        Self::new(&OllamaConfig::from_env().base_url)
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl GenerateClient for OllamaClient {
    #[instrument(skip(self, request), fields(host = %self.host, model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateStream> {
        let url = format!("{}/api/generate", self.host);
        debug!("Sending generate request");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| LlamaRateError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlamaRateError::OllamaError(format!(
                "Generate failed: {} - {}",
                status,
                body.trim()
            )));
        }

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlamaRateError::Http(e.to_string())));

        Ok(decode_stream(body))
    }
}

/// Splits a byte stream into newline-delimited JSON responses. Lines may span
/// network chunks, and a final line without a trailing newline is accepted.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
    // Bytes of `buf` already known to hold no newline
    scanned: usize,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<GenerateResponse>> {
        self.buf.extend_from_slice(bytes);

        let mut out = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buf[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            if let Some(item) = parse_line(&self.buf[start..end]) {
                out.push(item);
            }
            start = end + 1;
            from = start;
        }

        self.buf.drain(..start);
        self.scanned = self.buf.len();
        out
    }

    pub fn finish(&mut self) -> Option<Result<GenerateResponse>> {
        let line = std::mem::take(&mut self.buf);
        self.scanned = 0;
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<Result<GenerateResponse>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<GenerateResponse>(text)
        .map_err(LlamaRateError::from)
        .and_then(|resp| match resp.error {
            Some(message) => Err(LlamaRateError::OllamaError(message)),
            None => Ok(resp),
        });
    Some(parsed)
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    decoder: NdjsonDecoder,
    pending: VecDeque<Result<GenerateResponse>>,
    exhausted: bool,
}

/// Turn a raw body stream into a stream of decoded chunks.
pub fn decode_stream<S, B>(body: S) -> GenerateStream
where
    S: Stream<Item = Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: NdjsonDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    let stream = futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.exhausted {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let items = st.decoder.push(bytes.as_ref());
                    st.pending.extend(items);
                }
                Some(Err(e)) => {
                    st.exhausted = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.exhausted = true;
                    if let Some(item) = st.decoder.finish() {
                        st.pending.push_back(item);
                    }
                }
            }
        }
    });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTIAL: &str = r#"{"model":"llama3.1","response":"Hel","done":false}"#;
    const FINAL: &str = r#"{"model":"llama3.1","response":"","done":true,"prompt_eval_count":26,"prompt_eval_duration":130000000,"eval_count":290,"eval_duration":4709213000}"#;

    #[test]
    fn test_request_serializes_deterministic_streaming() {
        let request = GenerateRequest::new("llama3.1", "Why is the sky blue?");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3.1");
        assert_eq!(value["prompt"], "Why is the sky blue?");
        assert_eq!(value["stream"], true);
        assert_eq!(value["options"]["temperature"], 0.0);
        assert_eq!(value["options"]["seed"], 0);
    }

    #[test]
    fn test_decoder_handles_lines_split_across_chunks() {
        let body = format!("{}\n{}\n", PARTIAL, FINAL);
        let (a, b) = body.as_bytes().split_at(PARTIAL.len() + 10);

        let mut decoder = NdjsonDecoder::new();
        let first = decoder.push(a);
        assert_eq!(first.len(), 1);
        assert!(!first[0].as_ref().unwrap().done);

        let second = decoder.push(b);
        assert_eq!(second.len(), 1);
        let last = second[0].as_ref().unwrap();
        assert!(last.done);
        assert_eq!(last.metrics.prompt_eval_count, 26);
        assert_eq!(last.metrics.eval_count, 290);
        assert_eq!(last.metrics.eval_duration, 4_709_213_000);

        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_decoder_accepts_unterminated_final_line() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.push(FINAL.as_bytes()).is_empty());
        let last = decoder.finish().unwrap().unwrap();
        assert!(last.done);
    }

    #[test]
    fn test_decoder_scans_only_new_bytes() {
        let body = format!("{}\n{}\n", FINAL, PARTIAL);
        let mut decoder = NdjsonDecoder::new();
        let mut items = Vec::new();

        for byte in body.as_bytes() {
            items.extend(decoder.push(std::slice::from_ref(byte)));
            assert_eq!(decoder.scanned, decoder.buf.len());
        }

        assert_eq!(items.len(), 2);
        assert!(items[0].as_ref().unwrap().done);
        assert_eq!(items[1].as_ref().unwrap().response, "Hel");
        assert!(decoder.buf.is_empty());
    }

    #[test]
    fn test_decoder_skips_blank_lines() {
        let mut decoder = NdjsonDecoder::new();
        let items = decoder.push(format!("\n\r\n{}\n\n", PARTIAL).as_bytes());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_error_chunk_becomes_error() {
        let mut decoder = NdjsonDecoder::new();
        let items = decoder.push(b"{\"error\":\"model 'nope' not found\"}\n");
        match &items[0] {
            Err(LlamaRateError::OllamaError(msg)) => assert!(msg.contains("not found")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_is_json_error() {
        let mut decoder = NdjsonDecoder::new();
        let items = decoder.push(b"{not json}\n");
        assert!(matches!(items[0], Err(LlamaRateError::Json(_))));
    }

    #[tokio::test]
    async fn test_decode_stream_yields_chunks_in_order() {
        let body = format!("{}\n{}", PARTIAL, FINAL);
        let chunks: Vec<Result<Vec<u8>>> = body
            .as_bytes()
            .chunks(7)
            .map(|c| Ok(c.to_vec()))
            .collect();

        let decoded: Vec<GenerateResponse> = decode_stream(futures::stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].response, "Hel");
        assert!(decoded[1].done);
    }

    #[tokio::test]
    async fn test_decode_stream_surfaces_transport_error() {
        let chunks: Vec<Result<Vec<u8>>> = vec![
            Ok(format!("{}\n", PARTIAL).into_bytes()),
            Err(LlamaRateError::Http("connection reset".into())),
        ];
        let mut stream = decode_stream(futures::stream::iter(chunks));

        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(LlamaRateError::Http(_))
        ));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_client_rejects_invalid_host() {
        assert!(matches!(
            OllamaClient::new("not a url"),
            Err(LlamaRateError::Config(_))
        ));
        let client = OllamaClient::new("http://127.0.0.1:11434/").unwrap();
        assert_eq!(client.host(), "http://127.0.0.1:11434");
    }
}
