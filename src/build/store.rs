//! The content store: every document and static file under the content root.
//!
//! Loaded in one sequential pass. Items are ordered by their relative path
//! so everything downstream is independent of directory iteration order.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::document::{ContentDocument, ContentItem, DocumentError, StaticFile};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("content path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("content path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Document {
        path: PathBuf,
        source: DocumentError,
    },
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
pub struct ContentStore {
    pub documents: Vec<ContentDocument>,
    pub static_files: Vec<StaticFile>,
}

impl ContentStore {
    /// Load every document and static file under `root`.
    pub fn load(root: &Path) -> Result<Self, ContentError> {
        if !root.exists() {
            return Err(ContentError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ContentError::NotADirectory(root.to_path_buf()));
        }

        let mut items = Vec::new();
        walk_directory(root, &PathBuf::new(), &mut items)?;
        items.sort_by(|a, b| a.source_path().cmp(b.source_path()));

        let mut documents = Vec::new();
        let mut static_files = Vec::new();
        for item in items {
            match item {
                ContentItem::Document(doc) => documents.push(doc),
                ContentItem::Static(file) => static_files.push(file),
            }
        }

        debug!(
            root = %root.display(),
            documents = documents.len(),
            static_files = static_files.len(),
            "loaded content store"
        );

        Ok(Self {
            documents,
            static_files,
        })
    }
}

/// Recursively walk a directory and collect content items.
fn walk_directory(
    dir: &Path,
    relative_path: &Path,
    items: &mut Vec<ContentItem>,
) -> Result<(), ContentError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ContentError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ContentError::ReadEntry {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        let file_name = entry.file_name();
        let file_name_str = file_name.to_string_lossy();

        // Skip hidden files and directories
        if file_name_str.starts_with('.') {
            continue;
        }

        if path.is_dir() && file_name_str == "node_modules" {
            continue;
        }

        let item_relative_path = relative_path.join(&file_name);

        if path.is_dir() {
            walk_directory(&path, &item_relative_path, items)?;
        } else if path.is_file() {
            items.push(classify_file(&path, item_relative_path)?);
        }
    }

    Ok(())
}

/// Classify a file as either a document or a static file.
fn classify_file(full_path: &Path, relative_path: PathBuf) -> Result<ContentItem, ContentError> {
    if !is_markdown(&relative_path) {
        return Ok(ContentItem::Static(StaticFile::new(relative_path)));
    }

    let raw = std::fs::read_to_string(full_path).map_err(|e| ContentError::ReadFile {
        path: full_path.to_path_buf(),
        source: e,
    })?;

    let doc = ContentDocument::parse(relative_path, &raw).map_err(|e| ContentError::Document {
        path: full_path.to_path_buf(),
        source: e,
    })?;

    Ok(ContentItem::Document(doc))
}

/// `.md` and `.mdx` files are documents. MDX bodies are rendered as plain
/// markdown.
fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_lowercase().as_str(), "md" | "mdx"))
}
