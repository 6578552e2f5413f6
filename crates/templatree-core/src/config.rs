//! Scanner execution options.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How a scan is executed. Does not affect the resulting tree.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct ScanOptions {
    /// Number of threads for sibling processing (0 = shared rayon pool).
    #[serde(default)]
    pub threads: usize,

    /// Process the entries of one directory in parallel.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

impl ScanOptions {
    /// Create a new scan options builder.
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }

    /// Options for a sequential, single-threaded walk.
    pub fn sequential() -> Self {
        Self {
            threads: 0,
            parallel: false,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            parallel: true,
        }
    }
}
