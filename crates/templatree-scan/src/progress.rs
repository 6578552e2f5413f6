//! Scan progress reporting.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of folders listed so far.
    pub folders_scanned: u64,
    /// Number of files added to the tree so far.
    pub files_read: u64,
    /// Bytes of text content read so far.
    pub bytes_read: u64,
    /// Files recorded with error content so far.
    pub degraded: u64,
    /// Path most recently processed.
    pub current_path: PathBuf,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

/// Shared counters updated from the walk's worker threads.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    folders_scanned: AtomicU64,
    files_read: AtomicU64,
    bytes_read: AtomicU64,
    degraded: AtomicU64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            folders_scanned: AtomicU64::new(0),
            files_read: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            degraded: AtomicU64::new(0),
        }
    }

    /// Record a file; returns the number of files recorded before it.
    pub fn record_file(&self, bytes: u64, degraded: bool) -> u64 {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        if degraded {
            self.degraded.fetch_add(1, Ordering::Relaxed);
        }
        self.files_read.fetch_add(1, Ordering::Relaxed)
    }

    pub fn record_folder(&self) {
        self.folders_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, current_path: PathBuf) -> ScanProgress {
        ScanProgress {
            folders_scanned: self.folders_scanned.load(Ordering::Relaxed),
            files_read: self.files_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            current_path,
            elapsed: self.start_time.elapsed(),
        }
    }
}
