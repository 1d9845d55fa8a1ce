use log::{debug, warn};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::{AlertRules, MonitorConfig};
use crate::format::format_size;
use crate::probe::{HostProbe, NetTotals};
use crate::sampler::{ProcessSampler, top_by_cpu};
use crate::scanner::ScanReader;
use crate::types::{Alert, HostMetrics, ProcessSample, Snapshot};

pub const TOP_PROCESSES: usize = 3;

/// Builds one [`Snapshot`] per cycle.
///
/// Owns the state that has to survive between cycles: the previous network
/// counters and the per-process CPU baselines.
pub struct MetricsAggregator<P> {
    probe: P,
    config: MonitorConfig,
    sampler: ProcessSampler,
    scan: ScanReader,
    prev_net: Option<NetTotals>,
}

impl<P: HostProbe> MetricsAggregator<P> {
    pub fn new(probe: P, config: MonitorConfig, scan: ScanReader) -> Self {
        Self {
            probe,
            config,
            sampler: ProcessSampler::new(),
            scan,
            prev_net: None,
        }
    }

    /// Take the first network reading so the first cycle already has a baseline.
    pub fn prime(&mut self) {
        self.prev_net = self.probe.network_totals();
    }

    pub async fn cycle(&mut self) -> Snapshot {
        // The CPU window is what paces the loop.
        let cpu_percent = self.probe.cpu_percent(self.config.cpu_sample_window).await;

        let net = self.probe.network_totals();
        let (sent_rate, recv_rate) = match (self.prev_net, net) {
            (Some(prev), Some(cur)) => (
                cur.sent.saturating_sub(prev.sent),
                cur.received.saturating_sub(prev.received),
            ),
            _ => (0, 0),
        };
        if net.is_none() {
            debug!("[aggregator] network counters unavailable");
        }
        self.prev_net = net;

        let mut host = HostMetrics {
            cpu_percent,
            net_sent_bytes_per_sec: sent_rate,
            net_recv_bytes_per_sec: recv_rate,
            ..HostMetrics::default()
        };

        match self.probe.memory() {
            Some(mem) => {
                host.mem_used_bytes = mem.used;
                host.mem_total_bytes = mem.total;
                host.mem_percent = percent(mem.used, mem.total);
            }
            None => warn!("[aggregator] memory usage unavailable"),
        }

        match self.probe.disk(&self.config.disk_path) {
            Some(disk) => {
                host.disk_used_bytes = disk.used;
                host.disk_free_bytes = disk.free;
                host.disk_percent = percent(disk.used, disk.total);
            }
            None => warn!(
                "[aggregator] disk usage unavailable for {}",
                self.config.disk_path.display()
            ),
        }

        let observed = self.probe.processes();
        let samples = self.sampler.sample(&observed, Instant::now());
        let alerts = evaluate_alerts(&self.config.rules, &host, &samples);
        let top_processes = top_by_cpu(samples, TOP_PROCESSES);

        Snapshot {
            timestamp: current_epoch_secs(),
            host,
            top_processes,
            scan: self.scan.current(),
            alerts,
        }
    }
}

fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0) as f32
}

/// All alert rules, evaluated independently. Suspicious processes come first
/// in listing order, then CPU, memory and disk.
pub fn evaluate_alerts(
    rules: &AlertRules,
    host: &HostMetrics,
    processes: &[ProcessSample],
) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = processes
        .iter()
        .filter(|p| rules.is_suspicious(&p.name))
        .map(|p| {
            Alert(format!(
                "SUSPICIOUS PROCESS RUNNING: {} (PID: {})",
                p.name, p.pid
            ))
        })
        .collect();

    if host.cpu_percent > rules.cpu_percent {
        alerts.push(Alert(format!("High CPU Usage: {:.1}%", host.cpu_percent)));
    }
    if host.mem_percent > rules.memory_percent {
        alerts.push(Alert(format!("High Memory Usage: {:.1}%", host.mem_percent)));
    }
    if host.disk_percent > rules.disk_percent {
        alerts.push(Alert(format!(
            "Low Disk Space: {} free",
            format_size(host.disk_free_bytes)
        )));
    }
    alerts
}

fn current_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
