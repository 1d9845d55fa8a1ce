use std::path::PathBuf;
use std::time::Duration;

/// Process names that raise an alert whenever one is running.
pub const SUSPICIOUS_TOOLS: &[&str] = &[
    "nmap",
    "hydra",
    "netcat",
    "nc",
    "wireshark",
    "tcpdump",
    "john",
];

pub const CPU_ALERT_PERCENT: f32 = 90.0;
pub const MEMORY_ALERT_PERCENT: f32 = 90.0;
pub const DISK_ALERT_PERCENT: f32 = 95.0;

const SCAN_INTERVAL: Duration = Duration::from_secs(60);
const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Fixed alert rules, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct AlertRules {
    pub suspicious_tools: Vec<String>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            suspicious_tools: SUSPICIOUS_TOOLS.iter().map(|s| s.to_string()).collect(),
            cpu_percent: CPU_ALERT_PERCENT,
            memory_percent: MEMORY_ALERT_PERCENT,
            disk_percent: DISK_ALERT_PERCENT,
        }
    }
}

impl AlertRules {
    pub fn is_suspicious(&self, name: &str) -> bool {
        self.suspicious_tools.iter().any(|tool| tool == name)
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub rules: AlertRules,
    /// Root of the background large-file scan.
    pub scan_root: PathBuf,
    /// Pause between two completed scan passes.
    pub scan_interval: Duration,
    /// Window over which host CPU utilization is measured; also the loop cadence.
    pub cpu_sample_window: Duration,
    /// Mount point whose usage is reported on the disk line.
    pub disk_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rules: AlertRules::default(),
            scan_root: default_scan_root(),
            scan_interval: SCAN_INTERVAL,
            cpu_sample_window: CPU_SAMPLE_WINDOW,
            disk_path: PathBuf::from("/"),
        }
    }
}

/// The invoking user's home directory, or the current directory when it cannot be resolved.
pub fn default_scan_root() -> PathBuf {
    home::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
