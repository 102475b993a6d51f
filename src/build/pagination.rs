//! Previous/next links between blog posts.

use serde::Serialize;

use super::document::ContentDocument;
use super::slug::Slug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogLink {
    pub slug: Slug,
    pub title: String,
}

impl BlogLink {
    fn from_doc(doc: &ContentDocument) -> Self {
        Self {
            slug: doc.slug.clone(),
            title: doc.title(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    /// The older post
    pub previous: Option<BlogLink>,
    /// The newer post
    pub next: Option<BlogLink>,
}

/// Link each post to its neighbours.
///
/// `posts` must be sorted newest first. The result is parallel to `posts`:
/// the newest post has no `next` and the oldest has no `previous`.
pub fn link_posts(posts: &[&ContentDocument]) -> Vec<Neighbors> {
    (0..posts.len())
        .map(|i| Neighbors {
            previous: posts.get(i + 1).map(|doc| BlogLink::from_doc(doc)),
            next: i
                .checked_sub(1)
                .and_then(|j| posts.get(j))
                .map(|doc| BlogLink::from_doc(doc)),
        })
        .collect()
}
