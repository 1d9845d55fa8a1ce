//! Host metric sources.

use anyhow::{Result, bail};
use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::time::Duration;
use sysinfo::{Disks, Networks, ProcessStatus, ProcessesToUpdate, System};
use tokio::time::sleep;

use crate::sampler::ProcessObservation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub used: u64,
    pub free: u64,
    pub total: u64,
}

/// Cumulative bytes over all interfaces since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetTotals {
    pub sent: u64,
    pub received: u64,
}

/// Everything the aggregator reads from the host.
///
/// Each reading can be unavailable on its own; `None` means the source
/// could not answer this cycle.
#[async_trait]
pub trait HostProbe: Send {
    /// Host-wide CPU utilization measured across `window`. Takes at least `window`.
    async fn cpu_percent(&mut self, window: Duration) -> f32;

    fn memory(&mut self) -> Option<MemoryUsage>;

    fn disk(&mut self, mount: &Path) -> Option<DiskUsage>;

    fn network_totals(&mut self) -> Option<NetTotals>;

    /// All live processes, ordered by pid.
    fn processes(&mut self) -> Vec<ProcessObservation>;
}

pub struct SysinfoProbe {
    sys: System,
    networks: Networks,
    disks: Disks,
}

impl SysinfoProbe {
    /// Fails when the host cannot provide a first reading at all.
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            bail!("system metrics are not supported on this platform");
        }
        let mut sys = System::new();
        sys.refresh_memory();
        if sys.total_memory() == 0 {
            bail!("host reported no memory information");
        }
        sys.refresh_cpu_usage();

        Ok(Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
        })
    }
}

#[async_trait]
impl HostProbe for SysinfoProbe {
    async fn cpu_percent(&mut self, window: Duration) -> f32 {
        self.sys.refresh_cpu_usage();
        sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage()
    }

    fn memory(&mut self) -> Option<MemoryUsage> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        (total > 0).then(|| MemoryUsage {
            used: self.sys.used_memory(),
            total,
        })
    }

    fn disk(&mut self, mount: &Path) -> Option<DiskUsage> {
        self.disks.refresh(true);
        // Deepest mount point containing `mount`, so "/home/x" resolves to "/home" or "/".
        let disk = self
            .disks
            .list()
            .iter()
            .filter(|d| mount.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());
        let Some(disk) = disk else {
            debug!("[probe] no disk mounted at {}", mount.display());
            return None;
        };
        let total = disk.total_space();
        let free = disk.available_space();
        Some(DiskUsage {
            used: total.saturating_sub(free),
            free,
            total,
        })
    }

    fn network_totals(&mut self) -> Option<NetTotals> {
        self.networks.refresh(true);
        if self.networks.list().is_empty() {
            return None;
        }
        let totals = self
            .networks
            .list()
            .iter()
            .fold(NetTotals::default(), |acc, (_, data)| NetTotals {
                sent: acc.sent + data.total_transmitted(),
                received: acc.received + data.total_received(),
            });
        Some(totals)
    }

    fn processes(&mut self) -> Vec<ProcessObservation> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        let mut observed: Vec<ProcessObservation> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, proc)| ProcessObservation {
                pid: pid.as_u32(),
                name: proc.name().to_string_lossy().into_owned(),
                start_time: proc.start_time(),
                cpu_time_ms: (proc.status() != ProcessStatus::Zombie)
                    .then(|| proc.accumulated_cpu_time()),
            })
            .collect();
        observed.sort_by_key(|p| p.pid);
        observed
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_probe_reads_memory() {
        let mut probe = SysinfoProbe::new().unwrap();
        let mem = probe.memory().unwrap();
        assert!(mem.total > 0);
        assert!(mem.used <= mem.total);
    }

    #[test]
    fn test_sysinfo_probe_lists_own_process() {
        let mut probe = SysinfoProbe::new().unwrap();
        let procs = probe.processes();
        let me = std::process::id();
        assert!(procs.iter().any(|p| p.pid == me));
        assert!(procs.windows(2).all(|w| w[0].pid <= w[1].pid));
    }
}
