use serde::Deserialize;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Counters Ollama attaches to the final chunk of a generate response.
/// Durations are nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateMetrics {
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub load_duration: u64,
    #[serde(default)]
    pub prompt_eval_count: u64,
    #[serde(default)]
    pub prompt_eval_duration: u64,
    #[serde(default)]
    pub eval_count: u64,
    #[serde(default)]
    pub eval_duration: u64,
}

impl GenerateMetrics {
    /// Prompt tokens per second, `None` when the phase was not measured.
    pub fn prompt_rate(&self) -> Option<f64> {
        rate(self.prompt_eval_count, self.prompt_eval_duration)
    }

    /// Generated tokens per second, `None` when the phase was not measured.
    pub fn eval_rate(&self) -> Option<f64> {
        rate(self.eval_count, self.eval_duration)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration / 1_000_000
    }
}

fn rate(count: u64, duration_ns: u64) -> Option<f64> {
    if duration_ns == 0 {
        return None;
    }
    Some(count as f64 / (duration_ns as f64 / NANOS_PER_SEC))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_from_counts_and_durations() {
        let m = GenerateMetrics {
            prompt_eval_count: 100,
            prompt_eval_duration: 500_000_000,
            eval_count: 50,
            eval_duration: 2_000_000_000,
            ..Default::default()
        };
        assert_eq!(m.prompt_rate(), Some(200.0));
        assert_eq!(m.eval_rate(), Some(25.0));
    }

    #[test]
    fn test_zero_duration_is_unmeasured() {
        let m = GenerateMetrics {
            prompt_eval_count: 100,
            prompt_eval_duration: 0,
            eval_count: 0,
            eval_duration: 0,
            ..Default::default()
        };
        assert_eq!(m.prompt_rate(), None);
        assert_eq!(m.eval_rate(), None);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let m: GenerateMetrics = serde_json::from_str(r#"{"eval_count": 3}"#).unwrap();
        assert_eq!(m.eval_count, 3);
        assert_eq!(m.eval_duration, 0);
        assert_eq!(m.eval_rate(), None);
    }
}
