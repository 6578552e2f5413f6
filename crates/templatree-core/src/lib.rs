//! Core types for templatree.
//!
//! This crate provides the template tree data model, the filter policy a
//! scan applies, the error types, and the canonical text codec used to store
//! and reload trees.

pub mod codec;
mod config;
mod error;
mod node;
mod policy;
mod registry;
mod report;

pub use codec::{decode, decode_items, encode, encode_compact};
pub use config::{ScanOptions, ScanOptionsBuilder};
pub use error::{Result, ScanWarning, TemplateError, WarningKind};
pub use node::{
    ContentKind, PLACEHOLDER_PREFIX, READ_ERROR_PREFIX, TemplateFile,
    TemplateFolder, TemplateItem, placeholder_content, read_error_content,
};
pub use policy::{
    DEFAULT_EXCLUDED_FILES, DEFAULT_EXCLUDED_FOLDERS, DEFAULT_EXCLUDED_PATTERNS,
    DEFAULT_MAX_FILE_BYTES, FilterPolicy, PolicyOverrides, PolicyOverridesBuilder,
};
pub use registry::{StarterTemplate, TemplateRegistry};
pub use report::{ScanReport, TreeStats};
