//! Template directory scanning engine for templatree.
//!
//! # Overview
//!
//! `templatree-scan` walks a starter-template directory and builds the
//! portable [`TemplateFolder`] tree. Key features:
//!
//! - **Policy filtering** of excluded files, folders and name patterns
//! - **Size guard**: oversized files get placeholder content
//! - **Fault isolation**: an unreadable file is kept with error content
//! - **Parallel siblings** via rayon, with listing order preserved
//! - **Progress updates** via broadcast channels
//! - **Blob store** for atomically persisting encoded trees
//!
//! # Example
//!
//! ```rust,no_run
//! use templatree_scan::{FilterPolicy, TemplateScanner};
//!
//! let scanner = TemplateScanner::new();
//! let tree = scanner.scan("templates/react", &FilterPolicy::default()).unwrap();
//!
//! println!("{} files", tree.file_count());
//! println!("{}", templatree_scan::encode(&tree).unwrap());
//! ```
//!
//! # Transient round trip
//!
//! ```rust,no_run
//! use templatree_scan::{BlobStore, FilterPolicy, TemplateScanner};
//!
//! let store = BlobStore::new("output");
//! let tree = TemplateScanner::new()
//!     .scan("templates/react", &FilterPolicy::default())
//!     .unwrap();
//! let reloaded = store.round_trip(&tree, "REACT").unwrap();
//! assert_eq!(reloaded, tree);
//! ```

mod blob;
mod progress;
mod scanner;

pub use blob::{BlobHandle, BlobStore};
pub use progress::ScanProgress;
pub use scanner::{PROGRESS_INTERVAL, TemplateScanner, scan_template_directory};

// Re-export core types for convenience
pub use templatree_core::{
    ContentKind, FilterPolicy, PolicyOverrides, Result, ScanOptions, ScanReport, ScanWarning,
    TemplateError, TemplateFile, TemplateFolder, TemplateItem, TreeStats, WarningKind, decode,
    encode,
};
