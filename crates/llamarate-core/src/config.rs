use tracing::warn;

use crate::BenchmarkMode;

pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub model_id: String,
    pub mode: BenchmarkMode,
    /// Measured runs. One extra warm-up run is always issued first.
    pub runs: u32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            model_id: "llama3.1".to_string(),
            mode: BenchmarkMode::Generate,
            runs: 10,
        }
    }
}

impl BenchmarkConfig {
    pub fn total_cycles(&self) -> u64 {
        u64::from(self.runs) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT),
        }
    }
}

impl OllamaConfig {
    /// Resolve the endpoint from `OLLAMA_HOST`, falling back to the local default.
    pub fn from_env() -> Self {
        let host = std::env::var(OLLAMA_HOST_ENV).ok();
        Self::from_host(host.as_deref())
    }

    /// Accepts `host`, `host:port`, `scheme://host[:port][/path]` and bracketed IPv6.
    pub fn from_host(raw: Option<&str>) -> Self {
        let raw = raw
            .unwrap_or_default()
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'');

        let (scheme, rest, default_port) = match raw.split_once("://") {
            None => ("http", raw, DEFAULT_PORT),
            Some(("http", rest)) => ("http", rest, 80),
            Some(("https", rest)) => ("https", rest, 443),
            Some((scheme, rest)) => (scheme, rest, DEFAULT_PORT),
        };

        let (hostport, path) = match rest.split_once('/') {
            Some((hostport, path)) => (hostport, path),
            None => (rest, ""),
        };

        let (host, port) = split_host_port(hostport);
        let host = if host.is_empty() { DEFAULT_HOST } else { host };

        let port = match port {
            None => default_port,
            Some(p) => p.parse::<u16>().unwrap_or_else(|_| {
                warn!(port = p, fallback = default_port, "Invalid port, using default");
                default_port
            }),
        };

        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        let mut base_url = format!("{}://{}:{}", scheme, host, port);
        if !path.is_empty() {
            base_url.push('/');
            base_url.push_str(path.trim_end_matches('/'));
        }

        Self { base_url }
    }
}

fn split_host_port(hostport: &str) -> (&str, Option<&str>) {
    if let Some(inner) = hostport.strip_prefix('[') {
        return match inner.split_once(']') {
            Some((host, tail)) => (host, tail.strip_prefix(':')),
            None => (inner, None),
        };
    }

    // Bare IPv6 has more than one colon and never carries a port
    if hostport.matches(':').count() != 1 {
        return (hostport, None);
    }

    match hostport.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (hostport, None),
    }
}
