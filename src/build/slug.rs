//! Slug derivation.
//!
//! Every document gets exactly one slug, derived from its path relative to
//! the content root. Slugs double as page routes, so two documents sharing a
//! slug would overwrite each other's output; [`ensure_unique`] rejects that.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::document::ContentDocument;

#[derive(thiserror::Error, Debug)]
pub enum SlugError {
    #[error("slug collision on {slug}: {first} and {second} derive the same route")]
    Collision {
        slug: Slug,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A routable path such as `/css/naming/bem/`.
///
/// Always starts and ends with `/`; the content root's index is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Wrap an already-formed route (used for generated pages like `/blog/`).
    pub fn from_route(route: &str) -> Self {
        Slug(route.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the slug for a document from its content-relative path.
///
/// # Examples
/// ```ignore
/// derive_slug("css/naming/bem.md") => "/css/naming/bem/"
/// derive_slug("blog/hello/index.mdx") => "/blog/hello/"
/// derive_slug("index.md") => "/"
/// ```
pub fn derive_slug(relative_path: &Path) -> Slug {
    let without_extension = relative_path.with_extension("");

    let mut parts: Vec<String> = without_extension
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    // Index files become the directory route
    if parts.last().is_some_and(|last| last == "index") {
        parts.pop();
    }

    if parts.is_empty() {
        Slug("/".to_string())
    } else {
        Slug(format!("/{}/", parts.join("/")))
    }
}

/// Check that no two documents share a slug.
pub fn ensure_unique(documents: &[ContentDocument]) -> Result<(), SlugError> {
    let mut seen: HashMap<&Slug, &Path> = HashMap::with_capacity(documents.len());

    for doc in documents {
        if let Some(first) = seen.insert(&doc.slug, &doc.source_path) {
            return Err(SlugError::Collision {
                slug: doc.slug.clone(),
                first: first.to_path_buf(),
                second: doc.source_path.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::FrontMatter;
    use std::collections::HashSet;

    fn make_doc(path: &str) -> ContentDocument {
        ContentDocument::new(PathBuf::from(path), FrontMatter::default(), String::new())
    }

    #[test]
    fn test_derive_slug_simple() {
        assert_eq!(derive_slug(Path::new("about.md")).as_str(), "/about/");
    }

    #[test]
    fn test_derive_slug_nested() {
        assert_eq!(
            derive_slug(Path::new("css/naming/bem.md")).as_str(),
            "/css/naming/bem/"
        );
    }

    #[test]
    fn test_derive_slug_index() {
        assert_eq!(derive_slug(Path::new("index.md")).as_str(), "/");
        assert_eq!(
            derive_slug(Path::new("blog/hello-world/index.mdx")).as_str(),
            "/blog/hello-world/"
        );
    }

    #[test]
    fn test_derive_slug_keeps_case_and_inner_dots() {
        assert_eq!(
            derive_slug(Path::new("Git/v2.0-notes.md")).as_str(),
            "/Git/v2.0-notes/"
        );
    }

    #[test]
    fn test_ensure_unique_accepts_distinct() {
        let docs = vec![make_doc("css/index.md"), make_doc("css/naming.md")];
        assert!(ensure_unique(&docs).is_ok());
    }

    #[test]
    fn test_ensure_unique_rejects_index_and_file() {
        let docs = vec![make_doc("css/naming.md"), make_doc("css/naming/index.md")];

        match ensure_unique(&docs) {
            Err(SlugError::Collision {
                slug,
                first,
                second,
            }) => {
                assert_eq!(slug.as_str(), "/css/naming/");
                assert_eq!(first, PathBuf::from("css/naming.md"));
                assert_eq!(second, PathBuf::from("css/naming/index.md"));
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_fixture_content_slugs_are_unique() {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site/content");
        let store = crate::build::store::ContentStore::load(&root).unwrap();
        assert!(store.documents.len() > 1);

        ensure_unique(&store.documents).unwrap();

        let slugs: HashSet<&str> = store.documents.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs.len(), store.documents.len());
    }

    #[test]
    fn test_ensure_unique_rejects_md_and_mdx() {
        let docs = vec![make_doc("seo.md"), make_doc("seo.mdx")];
        assert!(ensure_unique(&docs).is_err());
    }
}
