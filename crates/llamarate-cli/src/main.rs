use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::{ArgAction, Parser};
use llamarate_benchmark::{BenchmarkRunner, GenerateClient, OllamaClient};
use llamarate_core::{write_report, BenchmarkConfig, BenchmarkMode, PromptSet, TimingAccumulator};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Long flags that may also be written with a single dash, e.g. `-runs 5`.
const LONG_FLAGS: &[&str] = &["model", "prompt", "runs", "help", "version"];

#[derive(Parser, Debug)]
#[command(name = "llamarate")]
#[command(version, about = "LlamaRate - Ollama token throughput benchmark", long_about = None)]
struct Cli {
    /// Model to benchmark
    #[arg(long, default_value = "llama3.1")]
    model: String,

    /// Benchmark a long prompt (vs. long generation)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    prompt: bool,

    /// Number of runs
    #[arg(long, default_value_t = 10)]
    runs: u32,
}

impl Cli {
    fn into_config(self) -> BenchmarkConfig {
        BenchmarkConfig {
            model_id: self.model,
            mode: BenchmarkMode::from_prompt_flag(self.prompt),
            runs: self.runs,
        }
    }
}

/// Rewrite `-model` / `-runs=3` into their `--` form so both styles parse.
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut passthrough = false;

    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }

            let Some(rest) = arg.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);

            if LONG_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Load the mode's prompt file from `dir`, then connect and run. A bad prompt
/// file fails before `connect` is called.
async fn run_benchmark<C, F>(config: &BenchmarkConfig, dir: &Path, connect: F) -> Result<TimingAccumulator>
where
    C: GenerateClient,
    F: FnOnce() -> llamarate_core::Result<C>,
{
    let prompts = PromptSet::load(&dir.join(config.mode.prompt_file()))?;
    let runner = BenchmarkRunner::new(connect()?);
    let timing = runner.run(config, &prompts).await?;
    Ok(timing)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args()));
    let config = cli.into_config();

    let timing = run_benchmark(&config, Path::new("."), OllamaClient::from_env).await?;
    info!(completed = timing.completed_runs(), "Benchmark finished");

    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, config.mode.label(), timing.rates(config.mode))?;
    stdout.flush()?;

    Ok(())
}
