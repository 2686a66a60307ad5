//! hq Driver - Main Entry Point
//!
//! Parses an HTML file inside fresh script engine instances over and over,
//! reads the comment tree border through the bridge, and verifies that no
//! document or selection outlives its instance.

mod options;
mod script;
mod stress;

use anyhow::{Context, Result};
use hq_js::BridgeConfig;
use tracing_subscriber::EnvFilter;

use options::Options;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = Options::from_env()?;
    let html = std::fs::read_to_string(&options.input)
        .with_context(|| format!("failed to read {}", options.input.display()))?;
    let script = script::border_script(&html)?;

    tracing::info!(
        input = %options.input.display(),
        bytes = html.len(),
        iterations = options.iterations,
        threads = options.threads,
        "starting"
    );

    let config = BridgeConfig::default();
    let report = stress::run(&config, &script, options.iterations, options.threads)?;
    stress::check_leaks()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} rounds on {} thread(s) in {:.2?}, border = {}",
            report.rounds,
            report.threads,
            report.elapsed,
            report.border.as_deref().unwrap_or("null")
        );
    }
    Ok(())
}
