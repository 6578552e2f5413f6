//! Depth-first template directory scanner.

use std::fs::{self, DirEntry};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use templatree_core::{
    FilterPolicy, PolicyOverrides, Result, ScanOptions, ScanReport, ScanWarning, TemplateError,
    TemplateFile, TemplateFolder, TemplateItem, TreeStats, read_error_content,
};

use crate::progress::{ProgressTracker, ScanProgress};

/// A progress snapshot is broadcast every this many files.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Scanner that turns a template directory into a [`TemplateFolder`].
///
/// Holds no per-scan state, so one scanner can serve concurrent scans of
/// different roots.
pub struct TemplateScanner {
    options: ScanOptions,
    progress_tx: broadcast::Sender<ScanProgress>,
}

/// Per-scan state shared by the walk's worker threads.
struct WalkContext<'a> {
    policy: &'a FilterPolicy,
    parallel: bool,
    warnings: Mutex<Vec<ScanWarning>>,
    progress: ProgressTracker,
    progress_tx: &'a broadcast::Sender<ScanProgress>,
}

/// Outcome of visiting one directory entry.
struct Visit {
    item: Option<TemplateItem>,
    stats: TreeStats,
}

impl Visit {
    fn skipped() -> Self {
        Self {
            item: None,
            stats: TreeStats {
                skipped: 1,
                ..TreeStats::default()
            },
        }
    }

    fn item(item: impl Into<TemplateItem>, stats: TreeStats) -> Self {
        Self {
            item: Some(item.into()),
            stats,
        }
    }
}

impl TemplateScanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self::with_options(ScanOptions::default())
    }

    /// Create a scanner with explicit options.
    pub fn with_options(options: ScanOptions) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            options,
            progress_tx,
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan `root` and return the tree.
    pub fn scan(&self, root: impl AsRef<Path>, policy: &FilterPolicy) -> Result<TemplateFolder> {
        self.scan_report(root, policy).map(ScanReport::into_tree)
    }

    /// Scan `root` and return the tree with statistics and warnings.
    ///
    /// Fails with `PathNotFound` or `NotADirectory` for a bad root and with
    /// `DirectoryListingFailed` when any directory cannot be listed. Files
    /// that cannot be read never fail the scan; they are kept with error
    /// content and reported as warnings.
    pub fn scan_report(&self, root: impl AsRef<Path>, policy: &FilterPolicy) -> Result<ScanReport> {
        let root = root.as_ref();

        let metadata = fs::metadata(root).map_err(|e| TemplateError::root_io(root, e))?;
        if !metadata.is_dir() {
            return Err(TemplateError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        info!(root = %root.display(), "Scanning template directory");

        let ctx = WalkContext {
            policy,
            parallel: self.options.parallel,
            warnings: Mutex::new(Vec::new()),
            progress: ProgressTracker::new(),
            progress_tx: &self.progress_tx,
        };

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());

        let (folder, stats) = self.run(|| self.walk_dir(root, name, &ctx))?;

        let scan_duration = ctx.progress.elapsed();
        let _ = self.progress_tx.send(ctx.progress.snapshot(root.to_path_buf()));

        info!(
            root = %root.display(),
            files = stats.files,
            folders = stats.folders,
            skipped = stats.skipped,
            degraded = stats.degraded,
            "Scan complete"
        );

        let warnings = ctx
            .warnings
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(ScanReport::new(
            folder,
            root.to_path_buf(),
            policy.clone(),
            stats,
            scan_duration,
            warnings,
        ))
    }

    /// Run the walk on a dedicated pool when a thread count is configured.
    fn run<T: Send>(&self, walk: impl FnOnce() -> T + Send) -> T {
        if self.options.threads == 0 || !self.options.parallel {
            return walk();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .build()
        {
            Ok(pool) => pool.install(walk),
            Err(err) => {
                warn!(error = %err, "Falling back to the shared thread pool");
                walk()
            }
        }
    }

    /// Build the folder node for `path` and everything beneath it.
    fn walk_dir(
        &self,
        path: &Path,
        name: String,
        ctx: &WalkContext<'_>,
    ) -> Result<(TemplateFolder, TreeStats)> {
        let entries = fs::read_dir(path)
            .map_err(|e| TemplateError::listing(path, e))?
            .collect::<std::io::Result<Vec<DirEntry>>>()
            .map_err(|e| TemplateError::listing(path, e))?;

        ctx.progress.record_folder();

        // Both branches collect in listing order.
        let visits = if ctx.parallel {
            entries
                .into_par_iter()
                .map(|entry| self.visit(entry, ctx))
                .collect::<Result<Vec<_>>>()?
        } else {
            entries
                .into_iter()
                .map(|entry| self.visit(entry, ctx))
                .collect::<Result<Vec<_>>>()?
        };

        let mut folder = TemplateFolder::new(name);
        let mut stats = TreeStats::new();
        for visit in visits {
            stats.absorb(&visit.stats);
            if let Some(item) = visit.item {
                folder.push(item);
            }
        }

        Ok((folder, stats))
    }

    fn visit(&self, entry: DirEntry, ctx: &WalkContext<'_>) -> Result<Visit> {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot determine entry type");
                ctx.warn(ScanWarning::unknown_entry_type(&path, &err));
                return Ok(Visit::skipped());
            }
        };

        if file_type.is_dir() {
            if ctx.policy.is_excluded_folder(&name) {
                debug!(path = %path.display(), "Skipping ignored folder");
                return Ok(Visit::skipped());
            }

            let (folder, mut stats) = self.walk_dir(&path, name, ctx)?;
            stats.folders += 1;
            return Ok(Visit::item(folder, stats));
        }

        if file_type.is_file() {
            if ctx.policy.should_skip_file(&name) {
                debug!(path = %path.display(), "Skipping ignored file");
                return Ok(Visit::skipped());
            }
            return Ok(self.read_file(&entry, &name, ctx));
        }

        debug!(path = %path.display(), "Skipping non-regular entry");
        Ok(Visit::skipped())
    }

    /// Build the file node. Never fails; read faults become error content.
    fn read_file(&self, entry: &DirEntry, name: &str, ctx: &WalkContext<'_>) -> Visit {
        let path = entry.path();
        let mut stats = TreeStats {
            files: 1,
            ..TreeStats::default()
        };

        let content = match entry.metadata() {
            Ok(metadata) if ctx.policy.exceeds_limit(metadata.len()) => {
                debug!(path = %path.display(), size = metadata.len(), "File exceeds size limit");
                stats.placeholders = 1;
                ctx.policy.placeholder(metadata.len())
            }
            Ok(_) => match fs::read_to_string(&path) {
                Ok(text) => {
                    stats.bytes_read = text.len() as u64;
                    text
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Error reading file");
                    ctx.warn(ScanWarning::read_error(&path, &err));
                    stats.degraded = 1;
                    read_error_content(&err)
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Error reading file metadata");
                ctx.warn(ScanWarning::metadata_error(&path, &err));
                stats.degraded = 1;
                read_error_content(&err)
            }
        };

        let seen = ctx.progress.record_file(stats.bytes_read, stats.degraded > 0);
        if (seen + 1) % PROGRESS_INTERVAL == 0 {
            let _ = ctx.progress_tx.send(ctx.progress.snapshot(path));
        }

        Visit::item(TemplateFile::from_file_name(name, content), stats)
    }
}

impl WalkContext<'_> {
    fn warn(&self, warning: ScanWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }
}

impl Default for TemplateScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `overrides` against the defaults and scan `root`.
pub fn scan_template_directory(
    root: impl AsRef<Path>,
    overrides: &PolicyOverrides,
) -> Result<TemplateFolder> {
    let policy = FilterPolicy::resolve(overrides)?;
    TemplateScanner::new().scan(root, &policy)
}
