//! Background large-file scanner.
//!
//! Walking a whole home directory takes far longer than one dashboard cycle,
//! so the scan runs on its own cadence and publishes the top entries of each
//! completed pass into a single-slot watch channel. The dashboard only ever
//! reads the last completed pass.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use walkdir::{DirEntry, WalkDir};

use crate::types::{LargeFileEntry, ScanSnapshot};

pub const TOP_FILES: usize = 3;

#[derive(Debug, Default)]
pub struct ScanPass {
    pub top: Vec<LargeFileEntry>,
    pub files_seen: usize,
    pub skipped: usize,
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Walk `root` once and keep the largest regular files.
///
/// Hidden directories are pruned before they are opened and symlinks are
/// never followed or counted. Entries that fail (permission denied, removed
/// during the walk) are skipped.
pub fn scan_tree(root: &Path) -> ScanPass {
    let mut pass = ScanPass::default();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("[scanner] skipping entry: {err}");
                pass.skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => files.push(LargeFileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                full_path: entry.into_path(),
            }),
            Err(err) => {
                debug!("[scanner] no metadata for {}: {err}", entry.path().display());
                pass.skipped += 1;
            }
        }
    }

    pass.files_seen = files.len();
    files.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    files.truncate(TOP_FILES);
    pass.top = files;
    pass
}

/// Read side of the published scan results.
#[derive(Debug, Clone)]
pub struct ScanReader {
    rx: watch::Receiver<ScanSnapshot>,
}

impl ScanReader {
    /// Latest published snapshot. Never waits on a pass in progress.
    pub fn current(&self) -> ScanSnapshot {
        self.rx.borrow().clone()
    }

    /// Resolve once a pass has completed and no new one is running.
    pub async fn wait_for_pass(&mut self) -> ScanSnapshot {
        let done = self
            .rx
            .wait_for(|s| s.completed && !s.scanning)
            .await
            .map(|snapshot| snapshot.clone());
        done.unwrap_or_else(|_| self.current())
    }
}

pub struct FileScanner {
    root: PathBuf,
    interval: Duration,
    tx: watch::Sender<ScanSnapshot>,
}

impl FileScanner {
    pub fn new(root: PathBuf, interval: Duration) -> (Self, ScanReader) {
        let (tx, rx) = watch::channel(ScanSnapshot {
            scanning: true,
            ..ScanSnapshot::default()
        });
        (Self { root, interval, tx }, ScanReader { rx })
    }

    /// Start scanning on the runtime. The task runs until the process exits.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!("[scanner] scanning {} every {:?}", self.root.display(), self.interval);
        loop {
            self.run_pass().await;
            sleep(self.interval).await;
        }
    }

    async fn run_pass(&self) {
        let mut marked = self.tx.borrow().clone();
        marked.scanning = true;
        self.tx.send_replace(marked);

        let root = self.root.clone();
        let started = Instant::now();
        match tokio::task::spawn_blocking(move || scan_tree(&root)).await {
            Ok(pass) => {
                info!(
                    "[scanner] pass done files={} skipped={} elapsed={:?}",
                    pass.files_seen,
                    pass.skipped,
                    started.elapsed()
                );
                self.tx.send_replace(ScanSnapshot {
                    entries: pass.top,
                    scanning: false,
                    completed: true,
                });
            }
            Err(err) => {
                // Keep the last good result; the next pass starts on schedule.
                warn!("[scanner] pass aborted: {err}");
                let mut previous = self.tx.borrow().clone();
                previous.scanning = false;
                self.tx.send_replace(previous);
            }
        }
    }
}
