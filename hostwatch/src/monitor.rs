use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregator::MetricsAggregator;
use crate::config::MonitorConfig;
use crate::dashboard;
use crate::probe::{HostProbe, SysinfoProbe};
use crate::scanner::FileScanner;
use crate::types::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Dashboard,
    /// One JSON object per cycle, no screen clearing.
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub output: OutputMode,
    /// Stop after a single cycle.
    pub once: bool,
}

/// Start the scanner, then sample and render until Ctrl-C.
pub async fn run(config: MonitorConfig, options: RunOptions) -> Result<()> {
    let probe = SysinfoProbe::new().context("failed to take the first host reading")?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => flag.store(true, Ordering::SeqCst),
            Err(err) => warn!("[monitor] cannot listen for Ctrl-C: {err}"),
        }
    });

    let mut stdout = std::io::stdout();
    if options.output == OutputMode::Dashboard {
        writeln!(stdout, "Starting System Monitor... (Press Ctrl+C to stop)")?;
    }
    let cycles = run_with_probe(probe, config, options, &mut stdout, &stop).await?;
    info!("[monitor] stopped after {cycles} cycles");

    if stop.load(Ordering::SeqCst) {
        writeln!(stdout, "\nStopping Monitor...")?;
    }
    Ok(())
}

/// The foreground loop over any probe and writer. Returns the number of cycles run.
///
/// `stop` is only checked between cycles. The scanner task is never joined;
/// it ends with the runtime.
pub async fn run_with_probe<P, W>(
    probe: P,
    config: MonitorConfig,
    options: RunOptions,
    out: &mut W,
    stop: &AtomicBool,
) -> Result<usize>
where
    P: HostProbe,
    W: Write,
{
    let (scanner, reader) = FileScanner::new(config.scan_root.clone(), config.scan_interval);
    // Detached on purpose: dropping the handle does not cancel the task.
    drop(scanner.spawn());

    let mut aggregator = MetricsAggregator::new(probe, config, reader);
    aggregator.prime();

    let mut cycles = 0;
    while !stop.load(Ordering::SeqCst) {
        let snapshot = aggregator.cycle().await;
        emit(out, &snapshot, options.output)?;
        cycles += 1;
        if options.once {
            break;
        }
    }
    Ok(cycles)
}

fn emit<W: Write>(out: &mut W, snapshot: &Snapshot, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Dashboard => dashboard::draw(out, snapshot)?,
        OutputMode::Json => {
            serde_json::to_writer(&mut *out, snapshot)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::CannedProbe;
    use crate::sampler::ProcessObservation;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(root: &TempDir) -> MonitorConfig {
        MonitorConfig {
            scan_root: root.path().to_path_buf(),
            cpu_sample_window: Duration::ZERO,
            ..MonitorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_single_dashboard_cycle() {
        let root = TempDir::new().unwrap();
        let options = RunOptions {
            once: true,
            ..RunOptions::default()
        };
        let stop = AtomicBool::new(false);
        let mut out = Vec::new();

        let cycles = run_with_probe(
            CannedProbe::with_load(50.0, 40, 60),
            config(&root),
            options,
            &mut out,
            &stop,
        )
        .await
        .unwrap();

        assert_eq!(cycles, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("REAL-TIME SYSTEM MONITOR"));
        assert!(!text.contains("ALERTS & WARNINGS"));
    }

    #[tokio::test]
    async fn test_stop_before_first_cycle() {
        let root = TempDir::new().unwrap();
        let stop = AtomicBool::new(true);
        let mut out = Vec::new();

        let cycles = run_with_probe(
            CannedProbe::with_load(50.0, 40, 60),
            config(&root),
            RunOptions::default(),
            &mut out,
            &stop,
        )
        .await
        .unwrap();

        assert_eq!(cycles, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_json_cycle_carries_alerts() {
        let root = TempDir::new().unwrap();
        let mut probe = CannedProbe::with_load(97.5, 40, 60);
        probe.processes.push(ProcessObservation {
            pid: 4242,
            name: "nmap".to_string(),
            start_time: 1,
            cpu_time_ms: Some(10),
        });
        let options = RunOptions {
            output: OutputMode::Json,
            once: true,
        };
        let stop = AtomicBool::new(false);
        let mut out = Vec::new();

        run_with_probe(probe, config(&root), options, &mut out, &stop)
            .await
            .unwrap();

        let line = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        let alerts = value["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0], "SUSPICIOUS PROCESS RUNNING: nmap (PID: 4242)");
        assert_eq!(alerts[1], "High CPU Usage: 97.5%");
        assert_eq!(value["top_processes"][0]["name"], "nmap");
    }
}
