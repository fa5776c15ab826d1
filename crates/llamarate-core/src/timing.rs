use tracing::debug;

use crate::{BenchmarkMode, GenerateMetrics};

/// Per-run rates gathered across a benchmark. The first completed run is a
/// warm-up and never contributes samples.
#[derive(Debug, Clone, Default)]
pub struct TimingAccumulator {
    prompt_rates: Vec<f64>,
    eval_rates: Vec<f64>,
    recording: bool,
    completed: u32,
}

impl TimingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the metrics of a response chunk. Only `done` chunks carry metrics.
    pub fn observe(&mut self, done: bool, metrics: &GenerateMetrics) {
        if done {
            self.record(metrics);
        }
    }

    /// Record the metrics of one completed run.
    pub fn record(&mut self, metrics: &GenerateMetrics) {
        self.completed += 1;

        if !self.recording {
            debug!("Discarding warm-up run");
            self.recording = true;
            return;
        }

        if let Some(rate) = metrics.prompt_rate() {
            debug!(rate, "prompt eval rate");
            self.prompt_rates.push(rate);
        }

        if let Some(rate) = metrics.eval_rate() {
            debug!(rate, "eval rate");
            self.eval_rates.push(rate);
        }
    }

    pub fn prompt_rates(&self) -> &[f64] {
        &self.prompt_rates
    }

    pub fn eval_rates(&self) -> &[f64] {
        &self.eval_rates
    }

    pub fn rates(&self, mode: BenchmarkMode) -> &[f64] {
        match mode {
            BenchmarkMode::Prompt => &self.prompt_rates,
            BenchmarkMode::Generate => &self.eval_rates,
        }
    }

    /// Completed runs seen so far, warm-up included.
    pub fn completed_runs(&self) -> u32 {
        self.completed
    }
}
