//! Starter template keys and where their directories live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, TemplateError};

/// Starter templates a playground can be created from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum StarterTemplate {
    React,
    Nextjs,
    Express,
    Vue,
    Hono,
    Angular,
}

impl StarterTemplate {
    /// Directory name under the templates root.
    pub fn dir_name(&self) -> String {
        self.as_ref().to_ascii_lowercase()
    }
}

/// Maps starter templates to directories on disk.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    paths: HashMap<StarterTemplate, PathBuf>,
}

impl TemplateRegistry {
    /// Register every starter at `templates_root/<lower-case key>`.
    pub fn new(templates_root: impl AsRef<Path>) -> Self {
        let root = templates_root.as_ref();
        let paths = StarterTemplate::iter()
            .map(|starter| (starter, root.join(starter.dir_name())))
            .collect();
        Self { paths }
    }

    /// Point one starter at a different directory.
    pub fn with_path(mut self, starter: StarterTemplate, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(starter, path.into());
        self
    }

    pub fn path_for(&self, starter: StarterTemplate) -> Option<&Path> {
        self.paths.get(&starter).map(PathBuf::as_path)
    }

    /// Resolve a stored template key such as `"REACT"` to its directory.
    pub fn resolve(&self, key: &str) -> Result<(StarterTemplate, &Path)> {
        let unknown = || TemplateError::UnknownTemplate {
            key: key.to_string(),
        };
        let starter = StarterTemplate::from_str(key).map_err(|_| unknown())?;
        let path = self.path_for(starter).ok_or_else(unknown)?;
        Ok((starter, path))
    }
}
