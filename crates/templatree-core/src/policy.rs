//! Filter policy: which entries a scan omits and which files it reads.

use derive_builder::Builder;
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, TemplateError};
use crate::node::placeholder_content;

/// Default size threshold: files above 1 MiB get placeholder content.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// File names always skipped: lock files, OS/editor metadata, env files.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    ".DS_Store",
    "thumbs.db",
    ".gitignore",
    ".npmrc",
    ".yarnrc",
    ".env",
    ".env.local",
    ".env.development",
    ".env.production",
];

/// Folder names always skipped along with their contents.
pub const DEFAULT_EXCLUDED_FOLDERS: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    ".idea",
    "dist",
    "build",
    "coverage",
];

/// File name patterns always skipped.
pub const DEFAULT_EXCLUDED_PATTERNS: &[&str] = &[
    r"^\..+\.swp$", // vim swap files
    r"^\.#",        // emacs lock files
    r"~$",          // backup files
];

/// Caller-supplied additions to the built-in policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverrides {
    /// Extra exact file names to skip.
    #[serde(default)]
    pub exclude_files: Vec<String>,

    /// Extra exact folder names to skip.
    #[serde(default)]
    pub exclude_folders: Vec<String>,

    /// Extra file name patterns (regular expressions) to skip.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Replaces the default size threshold when set.
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

impl PolicyOverrides {
    /// Create a new overrides builder.
    pub fn builder() -> PolicyOverridesBuilder {
        PolicyOverridesBuilder::default()
    }

    /// Parse overrides from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Append another set of overrides; a threshold in `other` wins.
    pub fn merge(mut self, other: PolicyOverrides) -> Self {
        self.exclude_files.extend(other.exclude_files);
        self.exclude_folders.extend(other.exclude_folders);
        self.exclude_patterns.extend(other.exclude_patterns);
        if other.max_file_bytes.is_some() {
            self.max_file_bytes = other.max_file_bytes;
        }
        self
    }
}

/// Effective exclusion rules and size threshold for one scan.
///
/// Built by merging the defaults with [`PolicyOverrides`]; immutable once
/// resolved and passed by reference through the walk.
#[derive(Debug, Clone, Serialize)]
pub struct FilterPolicy {
    excluded_file_names: IndexSet<String>,
    excluded_folder_names: IndexSet<String>,
    #[serde(serialize_with = "serialize_patterns")]
    excluded_name_patterns: Vec<Regex>,
    max_file_bytes: u64,
}

impl FilterPolicy {
    /// Merge the built-in defaults with `overrides`.
    ///
    /// Name and pattern sets are unioned with duplicates collapsed; the size
    /// threshold is replaced only when the override carries one.
    pub fn resolve(overrides: &PolicyOverrides) -> Result<Self> {
        let excluded_file_names = union(DEFAULT_EXCLUDED_FILES, &overrides.exclude_files);
        let excluded_folder_names = union(DEFAULT_EXCLUDED_FOLDERS, &overrides.exclude_folders);

        let excluded_name_patterns = union(DEFAULT_EXCLUDED_PATTERNS, &overrides.exclude_patterns)
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern)
                    .map_err(|source| TemplateError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            excluded_file_names,
            excluded_folder_names,
            excluded_name_patterns,
            max_file_bytes: overrides.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
        })
    }

    /// Check if a file name is excluded by exact match.
    pub fn is_excluded_file(&self, name: &str) -> bool {
        self.excluded_file_names.contains(name)
    }

    /// Check if a folder name is excluded.
    pub fn is_excluded_folder(&self, name: &str) -> bool {
        self.excluded_folder_names.contains(name)
    }

    /// Check if a file name matches any exclusion pattern.
    pub fn matches_pattern(&self, name: &str) -> bool {
        self.excluded_name_patterns.iter().any(|re| re.is_match(name))
    }

    /// Check if a regular file should be omitted from the tree.
    pub fn should_skip_file(&self, name: &str) -> bool {
        self.is_excluded_file(name) || self.matches_pattern(name)
    }

    /// Check if a file of `size` bytes gets placeholder content.
    pub fn exceeds_limit(&self, size: u64) -> bool {
        size > self.max_file_bytes
    }

    /// Placeholder content for a file of `size` bytes.
    pub fn placeholder(&self, size: u64) -> String {
        placeholder_content(size, self.max_file_bytes)
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn excluded_file_names(&self) -> impl Iterator<Item = &str> {
        self.excluded_file_names.iter().map(String::as_str)
    }

    pub fn excluded_folder_names(&self) -> impl Iterator<Item = &str> {
        self.excluded_folder_names.iter().map(String::as_str)
    }

    pub fn excluded_name_patterns(&self) -> impl Iterator<Item = &str> {
        self.excluded_name_patterns.iter().map(Regex::as_str)
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::resolve(&PolicyOverrides::default()).expect("built-in patterns are valid")
    }
}

impl PartialEq for FilterPolicy {
    fn eq(&self, other: &Self) -> bool {
        self.excluded_file_names == other.excluded_file_names
            && self.excluded_folder_names == other.excluded_folder_names
            && self.max_file_bytes == other.max_file_bytes
            && self
                .excluded_name_patterns()
                .eq(other.excluded_name_patterns())
    }
}

fn union(defaults: &[&str], extra: &[String]) -> IndexSet<String> {
    defaults
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned())
        .collect()
}

fn serialize_patterns<S: Serializer>(
    patterns: &[Regex],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(patterns.iter().map(Regex::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = FilterPolicy::default();
        assert_eq!(policy.max_file_bytes(), DEFAULT_MAX_FILE_BYTES);
        assert!(policy.is_excluded_file("yarn.lock"));
        assert!(policy.is_excluded_file(".env"));
        assert!(policy.is_excluded_folder("node_modules"));
        assert!(policy.is_excluded_folder(".git"));
        assert!(!policy.is_excluded_folder("src"));
    }

    #[test]
    fn test_default_patterns() {
        let policy = FilterPolicy::default();
        assert!(policy.matches_pattern(".main.rs.swp"));
        assert!(policy.matches_pattern(".#index.js"));
        assert!(policy.matches_pattern("notes.txt~"));
        assert!(!policy.matches_pattern("main.rs"));
    }

    #[test]
    fn test_overrides_union() {
        let overrides = PolicyOverrides::builder()
            .exclude_files(vec!["README.md".to_string(), "yarn.lock".to_string()])
            .exclude_folders(vec!["docs".to_string()])
            .build()
            .unwrap();
        let policy = FilterPolicy::resolve(&overrides).unwrap();

        assert!(policy.is_excluded_file("README.md"));
        assert!(policy.is_excluded_file("package-lock.json"));
        assert!(policy.is_excluded_folder("docs"));
        assert!(policy.is_excluded_folder("dist"));
        assert_eq!(
            policy.excluded_file_names().count(),
            DEFAULT_EXCLUDED_FILES.len() + 1
        );
        assert_eq!(policy.max_file_bytes(), DEFAULT_MAX_FILE_BYTES);
    }

    #[test]
    fn test_threshold_override() {
        let overrides = PolicyOverrides::builder()
            .max_file_bytes(Some(512u64))
            .build()
            .unwrap();
        let policy = FilterPolicy::resolve(&overrides).unwrap();

        assert_eq!(policy.max_file_bytes(), 512);
        assert!(!policy.exceeds_limit(512));
        assert!(policy.exceeds_limit(513));
    }

    #[test]
    fn test_invalid_pattern() {
        let overrides = PolicyOverrides::builder()
            .exclude_patterns(vec!["(unclosed".to_string()])
            .build()
            .unwrap();
        let err = FilterPolicy::resolve(&overrides).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPattern { .. }));
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides = PolicyOverrides::from_json(
            r#"{"exclude_patterns": ["\\.log$"], "max_file_bytes": 2048}"#,
        )
        .unwrap();
        assert_eq!(overrides.exclude_patterns, vec![r"\.log$".to_string()]);
        assert_eq!(overrides.max_file_bytes, Some(2048));

        assert!(PolicyOverrides::from_json(r#"{"ignore": []}"#).is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let base = PolicyOverrides::builder()
            .exclude_files(vec!["a".to_string()])
            .max_file_bytes(Some(10u64))
            .build()
            .unwrap();
        let extra = PolicyOverrides::builder()
            .exclude_files(vec!["b".to_string()])
            .build()
            .unwrap();

        let merged = base.merge(extra);
        assert_eq!(merged.exclude_files, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(merged.max_file_bytes, Some(10));
    }
}
