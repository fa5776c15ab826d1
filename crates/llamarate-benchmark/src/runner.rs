use futures::StreamExt;
use llamarate_core::{BenchmarkConfig, LlamaRateError, PromptSet, Result, TimingAccumulator};
use tracing::{debug, info};

use crate::ollama::{GenerateClient, GenerateRequest, OllamaClient};

pub struct BenchmarkRunner<C = OllamaClient> {
    client: C,
}

impl<C: GenerateClient> BenchmarkRunner<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Issue `runs + 1` requests one after another. The first completed run
    /// is treated as warm-up by the accumulator.
    pub async fn run(&self, config: &BenchmarkConfig, prompts: &PromptSet) -> Result<TimingAccumulator> {
        info!(
            "Starting benchmark for model: {} ({} runs + warm-up)",
            config.model_id, config.runs
        );

        let mut timing = TimingAccumulator::new();

        for i in 0..=config.runs {
            let prompt = prompts.select(i as usize)?;
            match i {
                0 => info!("Warm-up run"),
                _ => info!("Run {}/{}", i, config.runs),
            }

            let request = GenerateRequest::new(&config.model_id, prompt);
            self.run_single(&request, &mut timing).await?;
        }

        Ok(timing)
    }

    async fn run_single(&self, request: &GenerateRequest, timing: &mut TimingAccumulator) -> Result<()> {
        let mut stream = self.client.generate(request).await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            timing.observe(chunk.done, &chunk.metrics);

            if chunk.done {
                debug!(
                    total_ms = chunk.metrics.total_duration_ms(),
                    prompt_eval_count = chunk.metrics.prompt_eval_count,
                    eval_count = chunk.metrics.eval_count,
                    "Run complete"
                );
                return Ok(());
            }
        }

        Err(LlamaRateError::StreamEnded)
    }
}
