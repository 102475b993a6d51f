//! Side navigation derived from document metadata.
//!
//! Navigation is per area: the area's documents are grouped by their
//! `section` front matter field. Sections appear in the order they are first
//! seen in the (already sorted) input, not alphabetically, and each section
//! keeps its documents in input order.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::document::ContentDocument;
use super::slug::Slug;

/// A navigation section (group of links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub name: String,
    pub items: Vec<NavLink>,
}

/// A single navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub slug: Slug,
    pub title: String,
}

/// Group documents into navigation sections.
///
/// Documents without a `section` are left out of the navigation; they still
/// get their own page.
pub fn derive_nav(docs: &[&ContentDocument]) -> Vec<NavSection> {
    let mut sections: Vec<NavSection> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for doc in docs {
        let Some(section) = doc.section() else {
            debug!(slug = %doc.slug, "document has no section, leaving it out of navigation");
            continue;
        };

        let position = *positions.entry(section).or_insert_with(|| {
            sections.push(NavSection {
                name: section.to_string(),
                items: Vec::new(),
            });
            sections.len() - 1
        });

        sections[position].items.push(NavLink {
            slug: doc.slug.clone(),
            title: doc.title(),
        });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::FrontMatter;
    use std::path::PathBuf;

    fn make_doc(path: &str, section: Option<&str>) -> ContentDocument {
        let front_matter = FrontMatter {
            area: Some("CSS".to_string()),
            section: section.map(String::from),
            ..Default::default()
        };
        ContentDocument::new(PathBuf::from(path), front_matter, String::new())
    }

    fn names(nav: &[NavSection]) -> Vec<&str> {
        nav.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_first_occurrence_order() {
        let docs = [
            make_doc("1.md", Some("B")),
            make_doc("2.md", Some("A")),
            make_doc("3.md", Some("B")),
            make_doc("4.md", Some("C")),
            make_doc("5.md", Some("A")),
        ];
        let refs: Vec<_> = docs.iter().collect();

        let nav = derive_nav(&refs);
        assert_eq!(names(&nav), vec!["B", "A", "C"]);
        assert_eq!(nav[0].items.len(), 2);
        assert_eq!(nav[0].items[0].slug.as_str(), "/1/");
        assert_eq!(nav[0].items[1].slug.as_str(), "/3/");
        assert_eq!(nav[1].items.len(), 2);
        assert_eq!(nav[2].items.len(), 1);
    }

    #[test]
    fn test_css_sections() {
        let docs = [
            make_doc("css/naming/bem.md", Some("Naming")),
            make_doc("css/naming/prefixes.md", Some("Naming")),
            make_doc("css/architecture/itcss.md", Some("Architecture")),
        ];
        let refs: Vec<_> = docs.iter().collect();

        let nav = derive_nav(&refs);
        assert_eq!(names(&nav), vec!["Naming", "Architecture"]);
        assert_eq!(nav[0].items.len(), 2);
        assert_eq!(nav[0].items[0].title, "Bem");
        assert_eq!(nav[0].items[1].title, "Prefixes");
    }

    #[test]
    fn test_documents_without_section_are_skipped() {
        let docs = [
            make_doc("css/index.md", None),
            make_doc("css/naming/bem.md", Some("Naming")),
        ];
        let refs: Vec<_> = docs.iter().collect();

        let nav = derive_nav(&refs);
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].items.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(derive_nav(&[]).is_empty());
    }
}
