//! Scan report and statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::error::ScanWarning;
use crate::node::TemplateFolder;
use crate::policy::FilterPolicy;

/// Summary statistics for a scanned template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Files included in the tree.
    pub files: u64,
    /// Folders included in the tree, excluding the root.
    pub folders: u64,
    /// Bytes of text content read.
    pub bytes_read: u64,
    /// Files represented by a size placeholder.
    pub placeholders: u64,
    /// Files whose metadata or content could not be read.
    pub degraded: u64,
    /// Entries omitted by policy or because of their type.
    pub skipped: u64,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge counts from another subtree.
    pub fn absorb(&mut self, other: &TreeStats) {
        self.files += other.files;
        self.folders += other.folders;
        self.bytes_read += other.bytes_read;
        self.placeholders += other.placeholders;
        self.degraded += other.degraded;
        self.skipped += other.skipped;
    }
}

/// Complete scan result with diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Root folder of the tree.
    pub root: TemplateFolder,

    /// Root path that was scanned.
    pub root_path: PathBuf,

    /// When this scan was performed.
    pub scanned_at: SystemTime,

    /// Duration of the scan.
    pub scan_duration: Duration,

    /// Effective policy used.
    pub policy: FilterPolicy,

    /// Summary statistics.
    pub stats: TreeStats,

    /// Degraded files and undeterminable entries, sorted by path.
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Create a new report.
    pub fn new(
        root: TemplateFolder,
        root_path: PathBuf,
        policy: FilterPolicy,
        stats: TreeStats,
        scan_duration: Duration,
        mut warnings: Vec<ScanWarning>,
    ) -> Self {
        warnings.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            root,
            root_path,
            scanned_at: SystemTime::now(),
            scan_duration,
            policy,
            stats,
            warnings,
        }
    }

    /// Check if any file was degraded or any entry could not be classified.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Consume the report, keeping only the tree.
    pub fn into_tree(self) -> TemplateFolder {
        self.root
    }
}
