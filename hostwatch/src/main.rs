use clap::Parser;
use hostwatch::{MonitorConfig, OutputMode, RunOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Real-time host monitor with large-file scanning")]
struct Args {
    /// Directory scanned for large files (default: home directory)
    #[arg(long)]
    scan_root: Option<PathBuf>,

    /// Mount point reported on the disk line
    #[arg(long, default_value = "/")]
    disk_path: PathBuf,

    /// Pause between two scan passes, in seconds
    #[arg(long, default_value_t = 60)]
    scan_interval_secs: u64,

    /// Render a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Print each snapshot as a JSON line instead of the dashboard
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = MonitorConfig {
        disk_path: args.disk_path,
        scan_interval: Duration::from_secs(args.scan_interval_secs),
        ..MonitorConfig::default()
    };
    if let Some(root) = args.scan_root {
        config.scan_root = root;
    }

    let options = RunOptions {
        output: if args.json {
            OutputMode::Json
        } else {
            OutputMode::Dashboard
        },
        once: args.once,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(hostwatch::monitor::run(config, options));
    // A scan pass may still be walking; dropping the runtime would wait for it.
    runtime.shutdown_background();
    result
}
