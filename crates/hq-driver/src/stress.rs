//! Repeated instance lifecycle runs with a leak check

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use hq_js::{BridgeConfig, Instance, JsValue, live_handles};
use serde::Serialize;

const PROGRESS_EVERY: usize = 100;

/// Outcome of a stress run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rounds: usize,
    pub threads: usize,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub border: Option<String>,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

/// Run `iterations` create/run/dispose rounds on each of `threads` threads
pub fn run(config: &BridgeConfig, script: &str, iterations: usize, threads: usize) -> Result<Report> {
    let start = Instant::now();

    let results: Vec<Result<Option<String>>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|worker| scope.spawn(move || rounds(config, script, iterations, worker)))
            .collect();
        workers
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("worker thread panicked")),
            })
            .collect()
    });

    let mut border = None;
    for result in results {
        border = result?;
    }

    Ok(Report {
        rounds: iterations * threads,
        threads,
        elapsed: start.elapsed(),
        border,
    })
}

/// Fail unless every document and selection in the process has been released
pub fn check_leaks() -> Result<()> {
    let live = live_handles();
    if live.total() != 0 {
        bail!(
            "leak check failed: {} documents and {} selections still registered",
            live.documents,
            live.selections
        );
    }
    tracing::debug!("leak check passed");
    Ok(())
}

fn rounds(config: &BridgeConfig, script: &str, iterations: usize, worker: usize) -> Result<Option<String>> {
    let mut border = None;
    for round in 0..iterations {
        let mut instance = Instance::new(config).context("failed to create engine instance")?;
        let value = instance
            .eval(script)
            .with_context(|| format!("script failed in round {} on worker {}", round, worker))?;
        instance.dispose();

        border = match value {
            JsValue::String(s) => Some(s),
            _ => None,
        };

        if (round + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(worker, round = round + 1, "progress");
        }
    }
    Ok(border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::border_script;

    #[test]
    fn test_run_reports_border() {
        let script = border_script(r#"<table class="comment-tree" border="1"></table>"#).unwrap();
        let config = BridgeConfig::default();
        let report = run(&config, &script, 20, 2).unwrap();
        assert_eq!(report.rounds, 40);
        assert_eq!(report.threads, 2);
        assert_eq!(report.border.as_deref(), Some("1"));
    }

    #[test]
    fn test_script_error_aborts() {
        let config = BridgeConfig::default();
        let err = run(&config, "throw new Error('stop')", 3, 1).unwrap_err();
        assert!(format!("{:#}", err).contains("round 0"));
    }

    #[test]
    fn test_report_json() {
        let report = Report {
            rounds: 3,
            threads: 1,
            elapsed: Duration::from_millis(42),
            border: Some("1".into()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rounds"], 3);
        assert_eq!(json["elapsed"], 42);
        assert_eq!(json["border"], "1");
    }
}
