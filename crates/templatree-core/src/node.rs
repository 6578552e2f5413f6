//! Template file and folder node types.

use std::fmt::Display;
use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Prefix of the content generated for files above the size threshold.
pub const PLACEHOLDER_PREFIX: &str = "[File content not included:";

/// Prefix of the content recorded for files that could not be read.
pub const READ_ERROR_PREFIX: &str = "Error reading file: ";

/// Build the placeholder content for a file of `size` bytes over `limit`.
pub fn placeholder_content(size: u64, limit: u64) -> String {
    format!(
        "{PLACEHOLDER_PREFIX} size ({size} bytes) exceeds maximum allowed size ({limit} bytes)]"
    )
}

/// Build the content recorded for a file whose metadata or bytes failed to load.
pub fn read_error_content(error: impl Display) -> String {
    format!("{READ_ERROR_PREFIX}{error}")
}

/// What a file node's content represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// The file's full text.
    Text,
    /// Generated placeholder for an oversized file.
    Placeholder,
    /// The file could not be read; content describes the fault.
    Unavailable,
}

/// A leaf file in a template tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Base name without extension.
    #[serde(rename = "filename")]
    name: CompactString,

    /// Extension without the leading dot (may be empty).
    #[serde(rename = "fileExtension")]
    extension: CompactString,

    /// Text content, placeholder, or read-error description.
    content: String,
}

impl TemplateFile {
    /// Create a file node from its parts.
    pub fn new(
        name: impl Into<CompactString>,
        extension: impl Into<CompactString>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            content: content.into(),
        }
    }

    /// Create a file node from a full file name, splitting off the extension.
    ///
    /// `index.html` becomes `index` / `html`, `a.tar.gz` becomes `a.tar` / `gz`
    /// and a dotfile such as `.bashrc` keeps its whole name with no extension.
    pub fn from_file_name(file_name: &str, content: impl Into<String>) -> Self {
        let (name, extension) = split_file_name(file_name);
        Self::new(name, extension, content)
    }

    /// Base name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Node content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Reassemble the on-disk file name.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Classify the content by its prefix.
    pub fn content_kind(&self) -> ContentKind {
        if self.content.starts_with(READ_ERROR_PREFIX) {
            ContentKind::Unavailable
        } else if self.content.starts_with(PLACEHOLDER_PREFIX) {
            ContentKind::Placeholder
        } else {
            ContentKind::Text
        }
    }

    /// Check if the file could not be read.
    pub fn is_unavailable(&self) -> bool {
        self.content_kind() == ContentKind::Unavailable
    }
}

/// A folder in a template tree. Children keep directory-listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFolder {
    /// Folder base name.
    #[serde(rename = "folderName")]
    pub name: CompactString,

    /// Files and sub-folders in listing order.
    #[serde(rename = "items")]
    pub children: Vec<TemplateItem>,
}

impl TemplateFolder {
    /// Create an empty folder.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Create a folder with the given children.
    pub fn with_children(name: impl Into<CompactString>, children: Vec<TemplateItem>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Append a child, keeping insertion order.
    pub fn push(&mut self, item: impl Into<TemplateItem>) {
        self.children.push(item.into());
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Total number of files in this subtree.
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                TemplateItem::File(_) => 1,
                TemplateItem::Folder(folder) => folder.file_count(),
            })
            .sum()
    }

    /// Total number of folders beneath this one.
    pub fn folder_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                TemplateItem::File(_) => 0,
                TemplateItem::Folder(folder) => folder.folder_count() + 1,
            })
            .sum()
    }

    /// Find a direct child by its on-disk name.
    pub fn child(&self, name: &str) -> Option<&TemplateItem> {
        self.children.iter().find(|child| child.entry_name() == name)
    }

    /// Look up a descendant by `/`-separated path relative to this folder.
    pub fn find(&self, path: &str) -> Option<&TemplateItem> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.child(first)?;

        for segment in segments {
            match current {
                TemplateItem::Folder(folder) => current = folder.child(segment)?,
                TemplateItem::File(_) => return None,
            }
        }

        Some(current)
    }

    /// All files in depth-first order, paired with their path relative to this folder.
    pub fn walk_files(&self) -> Vec<(String, &TemplateFile)> {
        let mut out = Vec::new();
        self.collect_files("", &mut out);
        out
    }

    fn collect_files<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a TemplateFile)>) {
        for child in &self.children {
            let path = if prefix.is_empty() {
                child.entry_name()
            } else {
                format!("{prefix}/{}", child.entry_name())
            };
            match child {
                TemplateItem::File(file) => out.push((path, file)),
                TemplateItem::Folder(folder) => folder.collect_files(&path, out),
            }
        }
    }

    /// Check the structural invariants required by the canonical form.
    ///
    /// The root name only has to be non-empty; every descendant name must
    /// also be a single path segment.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Root folder name cannot be empty".into());
        }
        self.validate_children(self.name.as_str())
    }

    fn validate_children(&self, path: &str) -> Result<(), String> {
        for child in &self.children {
            match child {
                TemplateItem::File(file) => {
                    validate_name(file.name()).map_err(|e| format!("{path}: {e}"))?;
                    if file.extension().contains(['/', '\0']) {
                        return Err(format!("{path}/{}: invalid extension", file.name()));
                    }
                }
                TemplateItem::Folder(folder) => {
                    validate_name(&folder.name).map_err(|e| format!("{path}: {e}"))?;
                    folder.validate_children(&format!("{path}/{}", folder.name))?;
                }
            }
        }
        Ok(())
    }
}

/// Either a file or a folder, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateItem {
    File(TemplateFile),
    Folder(TemplateFolder),
}

impl TemplateItem {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, TemplateItem::File(_))
    }

    /// Check if this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, TemplateItem::Folder(_))
    }

    pub fn as_file(&self) -> Option<&TemplateFile> {
        match self {
            TemplateItem::File(file) => Some(file),
            TemplateItem::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&TemplateFolder> {
        match self {
            TemplateItem::Folder(folder) => Some(folder),
            TemplateItem::File(_) => None,
        }
    }

    /// Name as it appears on disk (files include their extension).
    pub fn entry_name(&self) -> String {
        match self {
            TemplateItem::File(file) => file.file_name(),
            TemplateItem::Folder(folder) => folder.name.to_string(),
        }
    }
}

impl From<TemplateFile> for TemplateItem {
    fn from(file: TemplateFile) -> Self {
        TemplateItem::File(file)
    }
}

impl From<TemplateFolder> for TemplateItem {
    fn from(folder: TemplateFolder) -> Self {
        TemplateItem::Folder(folder)
    }
}

/// Split a file name into base name and extension.
fn split_file_name(file_name: &str) -> (&str, &str) {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str());
    let extension = path.extension().and_then(|s| s.to_str());

    match (stem, extension) {
        (Some(stem), Some(ext)) => (stem, ext),
        (Some(stem), None) => (stem, ""),
        _ => (file_name, ""),
    }
}

/// Validate a single node name.
fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain {c:?}: {name}"));
        }
    }

    Ok(())
}
