/// Which inference phase a run of the benchmark reports on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BenchmarkMode {
    /// Long prompts, measures prompt-processing throughput.
    Prompt,
    /// Long generations, measures eval throughput.
    #[default]
    Generate,
}

impl BenchmarkMode {
    pub fn from_prompt_flag(prompt: bool) -> Self {
        if prompt {
            BenchmarkMode::Prompt
        } else {
            BenchmarkMode::Generate
        }
    }

    /// Prompt source file, relative to the working directory.
    pub fn prompt_file(&self) -> &'static str {
        match self {
            BenchmarkMode::Prompt => "prompt",
            BenchmarkMode::Generate => "generate",
        }
    }

    /// Label printed in front of the statistics line.
    pub fn label(&self) -> &'static str {
        match self {
            BenchmarkMode::Prompt => "prompt",
            BenchmarkMode::Generate => "eval",
        }
    }
}
