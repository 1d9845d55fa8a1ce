use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeFileEntry {
    pub name: String,
    pub size_bytes: u64,
    pub full_path: PathBuf,
}

/// Result of the most recently completed scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSnapshot {
    pub entries: Vec<LargeFileEntry>,
    pub scanning: bool,
    /// Set once at least one pass has finished.
    pub completed: bool,
}

/// What the file section of the dashboard should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanView<'a> {
    Pending,
    Empty,
    Files(&'a [LargeFileEntry]),
}

impl ScanSnapshot {
    pub fn view(&self) -> ScanView<'_> {
        if !self.entries.is_empty() {
            ScanView::Files(&self.entries)
        } else if self.scanning && !self.completed {
            ScanView::Pending
        } else {
            ScanView::Empty
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostMetrics {
    pub cpu_percent: f32,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
    pub mem_percent: f32,
    pub disk_used_bytes: u64,
    pub disk_free_bytes: u64,
    pub disk_percent: f32,
    pub net_sent_bytes_per_sec: u64,
    pub net_recv_bytes_per_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alert(pub String);

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything gathered in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub timestamp: u64,
    pub host: HostMetrics,
    pub top_processes: Vec<ProcessSample>,
    pub scan: ScanSnapshot,
    pub alerts: Vec<Alert>,
}
