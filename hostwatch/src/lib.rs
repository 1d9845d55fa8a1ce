pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod monitor;
pub mod probe;
pub mod sampler;
pub mod scanner;
pub mod types;

pub use aggregator::MetricsAggregator;
pub use config::{AlertRules, MonitorConfig};
pub use format::format_size;
pub use monitor::{OutputMode, RunOptions};
pub use scanner::{FileScanner, ScanReader};
pub use types::{Alert, HostMetrics, LargeFileEntry, ProcessSample, ScanSnapshot, Snapshot};
