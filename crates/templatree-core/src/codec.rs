//! Canonical text form of a template tree.
//!
//! Trees are encoded as JSON. Every node carries an explicit `type` tag:
//!
//! ```json
//! {
//!   "type": "folder",
//!   "folderName": "react-ts",
//!   "items": [
//!     { "type": "file", "filename": "index", "fileExtension": "html", "content": "..." }
//!   ]
//! }
//! ```
//!
//! `decode(encode(tree))` yields a tree equal to `tree`.

use compact_str::CompactString;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, TemplateError};
use crate::node::{TemplateFolder, TemplateItem};

/// Borrowed root wrapper so the root carries the same tag as nested folders.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RootRef<'a> {
    Folder(&'a TemplateFolder),
}

/// Encode a tree as pretty-printed JSON.
pub fn encode(tree: &TemplateFolder) -> Result<String> {
    validate_for_encode(tree)?;
    serde_json::to_string_pretty(&RootRef::Folder(tree)).map_err(serialization_failed)
}

/// Encode a tree as single-line JSON.
pub fn encode_compact(tree: &TemplateFolder) -> Result<String> {
    validate_for_encode(tree)?;
    serde_json::to_string(&RootRef::Folder(tree)).map_err(serialization_failed)
}

/// Decode a tree previously produced by [`encode`] or [`encode_compact`].
pub fn decode(text: &str) -> Result<TemplateFolder> {
    match from_json::<TemplateItem>(text)? {
        TemplateItem::Folder(folder) => {
            folder.validate().map_err(TemplateError::malformed)?;
            Ok(folder)
        }
        TemplateItem::File(_) => Err(TemplateError::malformed("root node must be a folder")),
    }
}

/// Decode either an encoded folder or a bare array of items.
///
/// A bare array is wrapped in a folder named `root_name`.
pub fn decode_items(text: &str, root_name: impl Into<CompactString>) -> Result<TemplateFolder> {
    if !text.trim_start().starts_with('[') {
        return decode(text);
    }

    let children: Vec<TemplateItem> = from_json(text)?;
    let folder = TemplateFolder::with_children(root_name, children);
    folder.validate().map_err(TemplateError::malformed)?;
    Ok(folder)
}

/// Parse `text` without a nesting limit; the stack grows on demand.
fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de)).map_err(malformed)?;
    de.end().map_err(malformed)?;
    Ok(value)
}

fn malformed(err: serde_json::Error) -> TemplateError {
    TemplateError::malformed(err.to_string())
}

fn validate_for_encode(tree: &TemplateFolder) -> Result<()> {
    tree.validate()
        .map_err(|message| TemplateError::SerializationFailed { message })
}

fn serialization_failed(err: serde_json::Error) -> TemplateError {
    TemplateError::SerializationFailed {
        message: err.to_string(),
    }
}
