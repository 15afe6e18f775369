use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use uxlens_core::payload::read::read_payload_from_reader;
use uxlens_core::report::{model::ToolInfo, render};
use uxlens_core::{inspect, inspect_value};

mod args;

fn main() -> Result<()> {
    let args = args::Args::parse();
    init_logging(args.verbose);

    let tool = ToolInfo {
        name: uxlens_core::TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let report = if args.reads_stdin() {
        let ctx = read_payload_from_reader(std::io::stdin().lock())
            .context("failed to load analysis payload from stdin")?;
        let (value, payload) = ctx.into_parts();
        inspect_value(&value, tool, payload)
    } else {
        inspect(&args.payload, tool)?
    };

    let output = match args.format {
        args::OutputFormat::Json if args.analysis_only => {
            serde_json::to_string_pretty(&report.analysis)? + "\n"
        }
        args::OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
        args::OutputFormat::Text => render::render_text(&report),
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, &output)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = output.len(), "output written");
        }
        None => print!("{output}"),
    }

    Ok(())
}

/// `RUST_LOG` wins unless `--verbose` asks for debug output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
