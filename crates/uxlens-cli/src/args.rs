use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "uxlens",
    version,
    about = "Normalize UX audit payloads into a canonical structured analysis"
)]
pub struct Args {
    /// Path to the JSON payload, or `-` to read stdin
    pub payload: PathBuf,

    /// Output format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Emit only the normalized analysis instead of the full report (JSON only)
    #[arg(long)]
    pub analysis_only: bool,

    /// Log normalization details to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Args {
    pub fn reads_stdin(&self) -> bool {
        self.payload == Path::new("-")
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
