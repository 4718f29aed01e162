//! Contains all file operation types.

use crate::model::{Location, TextRange};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Types of operations a safe delete can ask the document store to perform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OperationKind {
    /// Remove the text in `range`
    Delete,
    /// Replace the text in `range` with `new_text`
    Replace,
    /// Insert `new_text` at `range.start`
    Insert,
    /// Remove the whole file
    DeleteFile,
}

/// A single file modification, as prepared by a declaration or usage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    pub file_path: PathBuf,
    pub kind: OperationKind,
    pub range: TextRange,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub new_text: String,
    /// Description of what this operation does
    pub description: String,
}

impl FileOperation {
    pub fn delete_range(location: Location, description: impl Into<String>) -> Self {
        Self {
            file_path: location.file,
            kind: OperationKind::Delete,
            range: location.range,
            new_text: String::new(),
            description: description.into(),
        }
    }

    pub fn replace(
        location: Location,
        new_text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            file_path: location.file,
            kind: OperationKind::Replace,
            range: location.range,
            new_text: new_text.into(),
            description: description.into(),
        }
    }

    pub fn insert(
        file_path: impl Into<PathBuf>,
        offset: usize,
        text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind: OperationKind::Insert,
            range: TextRange::new(offset, offset),
            new_text: text.into(),
            description: description.into(),
        }
    }

    pub fn delete_file(file_path: impl Into<PathBuf>, description: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            kind: OperationKind::DeleteFile,
            range: TextRange::new(0, 0),
            new_text: String::new(),
            description: description.into(),
        }
    }

    /// Text that ends up in `range` once the operation is applied
    pub fn replacement(&self) -> &str {
        match self.kind {
            OperationKind::Delete | OperationKind::DeleteFile => "",
            _ => &self.new_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_an_empty_range() {
        let op = FileOperation::insert("a.rs", 7, "use x;\n", "Add import");

        assert_eq!(op.kind, OperationKind::Insert);
        assert!(op.range.is_empty());
        assert_eq!(op.range.start, 7);
        assert_eq!(op.replacement(), "use x;\n");
    }

    #[test]
    fn test_serialized_delete_omits_new_text() {
        let op = FileOperation::delete_range(Location::new("a.rs", 1..4), "Delete usage");
        let json = serde_json::to_value(&op).unwrap();

        assert_eq!(json["kind"], "delete");
        assert_eq!(json["filePath"], "a.rs");
        assert!(json.get("newText").is_none());
    }
}
