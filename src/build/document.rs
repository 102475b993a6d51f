use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::slug::{Slug, derive_slug};
use crate::util::{parse_date, title_case};

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

// =============================================================================
// Content items (documents and static files)
// =============================================================================

/// A content item discovered in the content directory.
/// Either a markdown document or a static file copied as-is.
#[derive(Debug, Clone)]
pub enum ContentItem {
    Document(ContentDocument),
    Static(StaticFile),
}

impl ContentItem {
    /// Get the content-relative path.
    pub fn source_path(&self) -> &Path {
        match self {
            ContentItem::Document(doc) => &doc.source_path,
            ContentItem::Static(file) => &file.source_path,
        }
    }
}

// =============================================================================
// Static files
// =============================================================================

/// A static file (image, CSS, PDF, ...) that gets copied to output.
#[derive(Debug, Clone)]
pub struct StaticFile {
    /// Path relative to the content root (e.g., "css/images/bem.png")
    pub source_path: PathBuf,
    /// Path relative to the output root, same as `source_path`
    pub output_path: PathBuf,
}

impl StaticFile {
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            output_path: source_path.clone(),
            source_path,
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// A markdown document loaded from the content directory.
///
/// Immutable once loaded. The slug is derived from `source_path` at
/// construction and never changes for the rest of the build.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// Path relative to the content root (e.g., "css/naming/bem.md")
    pub source_path: PathBuf,
    /// Route derived from the path (e.g., "/css/naming/bem/")
    pub slug: Slug,
    pub front_matter: FrontMatter,
    /// Markdown body without the front matter block
    pub body: String,
}

/// Front matter metadata parsed from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title (overrides the filename-derived title)
    pub title: Option<String>,
    /// Top-level category, selects which area the document belongs to
    pub area: Option<String>,
    /// Sub-category, used for navigation grouping
    pub section: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<DateTime<FixedOffset>>,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Additional arbitrary metadata, exposed to templates as `page.extra`
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_date(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

/// Result of parsing front matter from markdown content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub content: String,
}

/// Parse front matter from markdown content.
///
/// Front matter is a YAML block delimited by `---` at the start of the file:
///
/// ```markdown
/// ---
/// title: BEM
/// area: CSS
/// section: Naming
/// ---
///
/// # Content starts here
/// ```
///
/// A file without a front matter block parses to empty metadata. A block that
/// is present but not valid YAML is an error.
pub fn parse_front_matter(content: &str) -> Result<ParsedContent, DocumentError> {
    let content = content.trim_start();

    if !content.starts_with("---") {
        return Ok(ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        });
    }

    let after_opening = &content[3..];
    let Some(closing_pos) = after_opening.find("\n---") else {
        // No closing delimiter, treat entire content as markdown
        return Ok(ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        });
    };

    let yaml_content = after_opening[..closing_pos].trim_start_matches('\n');

    let markdown_start = 3 + closing_pos + 4; // "---" + yaml + "\n---"
    let markdown_content = if markdown_start < content.len() {
        content[markdown_start..].trim_start_matches('\n').to_string()
    } else {
        String::new()
    };

    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };

    Ok(ParsedContent {
        front_matter,
        content: markdown_content,
    })
}

impl ContentDocument {
    pub fn new(source_path: PathBuf, front_matter: FrontMatter, body: String) -> Self {
        Self {
            slug: derive_slug(&source_path),
            source_path,
            front_matter,
            body,
        }
    }

    /// Parse a document from its raw file contents.
    pub fn parse(source_path: PathBuf, raw: &str) -> Result<Self, DocumentError> {
        let parsed = parse_front_matter(raw)?;
        Ok(Self::new(source_path, parsed.front_matter, parsed.content))
    }

    /// Get the document title, falling back to the file name.
    ///
    /// Index files use their directory name, so `blog/third-post/index.md`
    /// becomes "Third Post".
    pub fn title(&self) -> String {
        if let Some(title) = &self.front_matter.title {
            return title.clone();
        }

        let stem = self.source_path.file_stem().and_then(|s| s.to_str());
        let name = match stem {
            Some("index") => self
                .source_path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .or(stem),
            other => other,
        };

        name.map(title_case)
            .unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn area(&self) -> Option<&str> {
        self.front_matter.area.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.front_matter.section.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_doc(path: &str) -> ContentDocument {
        ContentDocument::new(PathBuf::from(path), FrontMatter::default(), String::new())
    }

    #[test]
    fn test_document_title_fallback() {
        let doc = make_doc("css/naming/prefixes.md");
        assert_eq!(doc.title(), "Prefixes");
    }

    #[test]
    fn test_document_title_index_uses_directory() {
        let doc = make_doc("blog/third-post/index.md");
        assert_eq!(doc.title(), "Third Post");

        let root = make_doc("index.md");
        assert_eq!(root.title(), "Index");
    }

    #[test]
    fn test_document_title_from_front_matter() {
        let mut doc = make_doc("intro.md");
        doc.front_matter.title = Some("Welcome".to_string());
        assert_eq!(doc.title(), "Welcome");
    }

    #[test]
    fn test_document_slug_is_derived() {
        let doc = make_doc("css/naming/bem.md");
        assert_eq!(doc.slug.as_str(), "/css/naming/bem/");
    }

    #[test]
    fn test_parse_front_matter_basic() {
        let content = r#"---
title: BEM
area: CSS
section: Naming
description: Block, element, modifier
---

# Hello World
"#;
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title.as_deref(), Some("BEM"));
        assert_eq!(parsed.front_matter.area.as_deref(), Some("CSS"));
        assert_eq!(parsed.front_matter.section.as_deref(), Some("Naming"));
        assert_eq!(
            parsed.front_matter.description.as_deref(),
            Some("Block, element, modifier")
        );
        assert_eq!(parsed.content.trim(), "# Hello World");
    }

    #[test]
    fn test_parse_front_matter_date_and_author() {
        let content = r#"---
title: Third post
area: Blog
date: "2019-05-28T22:12:03.284Z"
author: Jane Doe
---
Body
"#;
        let parsed = parse_front_matter(content).unwrap();
        let date = parsed.front_matter.date.unwrap();
        assert_eq!(date.to_rfc3339(), "2019-05-28T22:12:03.284+00:00");
        assert_eq!(parsed.front_matter.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_parse_front_matter_plain_date() {
        let content = "---\ndate: 2021-03-01\n---\nBody";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(
            parsed.front_matter.date.unwrap().to_rfc3339(),
            "2021-03-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_front_matter_invalid_date() {
        let content = "---\ntitle: Broken\ndate: someday\n---\nBody";
        assert!(parse_front_matter(content).is_err());
    }

    #[test]
    fn test_parse_front_matter_invalid_yaml() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        assert!(parse_front_matter(content).is_err());
    }

    #[test]
    fn test_parse_front_matter_with_custom_fields() {
        let content = r#"---
title: Custom Page
tags:
  - css
  - naming
---

Content here
"#;
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title.as_deref(), Some("Custom Page"));
        assert!(parsed.front_matter.extra.contains_key("tags"));
        assert!(!parsed.front_matter.extra.contains_key("title"));
    }

    #[test]
    fn test_parse_front_matter_no_front_matter() {
        let content = "# Just Markdown\n\nNo front matter here.";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert!(parsed.content.starts_with("# Just Markdown"));
    }

    #[test]
    fn test_parse_front_matter_empty_front_matter() {
        let content = "---\n---\n\n# Content";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert!(parsed.content.starts_with("# Content"));
    }
}
