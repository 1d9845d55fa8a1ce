//! Fixed-layout text dashboard.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::format::{format_size, format_size_with_suffix};
use crate::types::{ScanView, Snapshot};

const WIDTH: usize = 60;
const PROCESS_NAME_MAX: usize = 30;
const FILE_NAME_MAX: usize = 40;

/// ANSI: clear screen and move the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Cut `name` to `keep` characters plus `...` once it exceeds `max`.
fn truncate(name: &str, max: usize, keep: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(keep).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

fn clock(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Render one snapshot. The output depends only on the snapshot.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let host = &snapshot.host;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "      REAL-TIME SYSTEM MONITOR  |  System: {}",
        std::env::consts::OS
    );
    let _ = writeln!(out, "      Time: {}", clock(snapshot.timestamp));
    let _ = writeln!(out, "{heavy}");

    let _ = writeln!(out, "CPU Usage    : {:.1}%", host.cpu_percent);
    let _ = writeln!(
        out,
        "RAM Usage    : {:.1}%  (Used: {} / Total: {})",
        host.mem_percent,
        format_size(host.mem_used_bytes),
        format_size(host.mem_total_bytes)
    );
    let _ = writeln!(
        out,
        "Disk Usage   : {:.1}%  (Used: {} / Free: {})",
        host.disk_percent,
        format_size(host.disk_used_bytes),
        format_size(host.disk_free_bytes)
    );
    let _ = writeln!(
        out,
        "Network      : ↓ {}  |  ↑ {}",
        format_size_with_suffix(host.net_recv_bytes_per_sec, "B/s"),
        format_size_with_suffix(host.net_sent_bytes_per_sec, "B/s")
    );

    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "{:<35} {:<10} CPU %", "TOP PROCESSES (High CPU)", "PID");
    let _ = writeln!(out, "{light}");
    for p in &snapshot.top_processes {
        let name = truncate(&p.name, PROCESS_NAME_MAX, PROCESS_NAME_MAX);
        let _ = writeln!(out, "{:<35} {:<10} {:.1}%", name, p.pid, p.cpu_percent);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "{:<45} SIZE", "LARGEST FILES (In User Home)");
    let _ = writeln!(out, "{light}");
    match snapshot.scan.view() {
        ScanView::Pending => {
            let _ = writeln!(out, " [Scanning disk for files... please wait] ");
        }
        ScanView::Empty => {
            let _ = writeln!(out, " [No files found or error scanning] ");
        }
        ScanView::Files(files) => {
            for file in files {
                let name = truncate(&file.name, FILE_NAME_MAX, FILE_NAME_MAX - 3);
                let _ = writeln!(out, "{:<45} {}", name, format_size(file.size_bytes));
            }
        }
    }

    if !snapshot.alerts.is_empty() {
        let bang = "!".repeat(WIDTH);
        let _ = writeln!(out);
        let _ = writeln!(out, "{bang}");
        let _ = writeln!(out, "  ALERTS & WARNINGS");
        let _ = writeln!(out, "{bang}");
        for alert in &snapshot.alerts {
            let _ = writeln!(out, " [!] {alert}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{heavy}");
    out
}

/// Clear the terminal and draw `snapshot` in place.
pub fn draw<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    out.write_all(CLEAR.as_bytes())?;
    out.write_all(render(snapshot).as_bytes())?;
    out.flush()
}
