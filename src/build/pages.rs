//! Page creation driven by the area table.
//!
//! Every area entry is queried from the content index and turned into page
//! descriptors, one per document. Areas are independent, so they are built on
//! the rayon pool; results are collected in table order, which keeps the
//! output identical from one build to the next. Area index pages are not tied
//! to a document and are kept apart as [`ListingPage`]s.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::document::ContentDocument;
use super::index::{ContentIndex, Field, Query, SortKey};
use super::pagination::{BlogLink, Neighbors, link_posts};
use super::paths::route_to_output_path;
use super::slug::Slug;
use crate::config::{AreaConfig, AreaTemplate};

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("duplicate route {route}: produced by '{first}' and '{second}'")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },
}

/// Which template renders a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Landing,
    BlogPost,
}

impl TemplateId {
    pub fn template_name(self) -> &'static str {
        match self {
            TemplateId::Landing => "landing.html",
            TemplateId::BlogPost => "blog-post.html",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub slug: Slug,
    /// Name of the area the page belongs to
    pub area: String,
    /// Display label of the area, not the document's own title
    pub title: String,
    pub previous: Option<BlogLink>,
    pub next: Option<BlogLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub route: Slug,
    pub template: TemplateId,
    pub context: PageContext,
}

/// A page listing every document of one area, served at the area's `index`
/// route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingPage {
    pub route: Slug,
    /// Name of the listed area
    pub area: String,
    pub title: String,
}

impl ListingPage {
    pub const TEMPLATE: &'static str = "area-index.html";
}

/// Every page the area table produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitePages {
    /// One descriptor per area document, in table order
    pub documents: Vec<PageDescriptor>,
    pub listings: Vec<ListingPage>,
}

impl SitePages {
    pub fn page_count(&self) -> usize {
        self.documents.len() + self.listings.len()
    }

    /// Every route with the area that produces it.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str)> {
        let documents = self
            .documents
            .iter()
            .map(|page| (page.route.as_str(), page.context.area.as_str()));
        let listings = self
            .listings
            .iter()
            .map(|page| (page.route.as_str(), page.area.as_str()));
        documents.chain(listings)
    }
}

/// The query selecting an area's pages, in page order.
///
/// Blog areas are newest first; the feed uses this same query.
pub fn area_query(area: &AreaConfig) -> Query {
    let query = Query::new().filter(Field::Area, area.name.clone());
    match area.template {
        AreaTemplate::BlogPost => query.sort(SortKey::desc(Field::Date)),
        AreaTemplate::Landing => query,
    }
}

/// The query feeding an area's side navigation.
pub fn nav_query(area: &AreaConfig) -> Query {
    area.nav_sort
        .iter()
        .cloned()
        .fold(Query::new().filter(Field::Area, area.name.clone()), Query::sort)
}

/// Build the page descriptors for every area in the table.
pub fn build_pages(index: &ContentIndex, areas: &[AreaConfig]) -> Result<SitePages, PageError> {
    let per_area: Vec<Vec<PageDescriptor>> = areas
        .par_iter()
        .map(|area| build_area_pages(index, area))
        .collect();

    let pages = SitePages {
        documents: per_area.into_iter().flatten().collect(),
        listings: areas.iter().filter_map(listing_page).collect(),
    };
    check_outputs(pages.routes())?;
    Ok(pages)
}

fn listing_page(area: &AreaConfig) -> Option<ListingPage> {
    let route = area.index.as_deref()?;
    Some(ListingPage {
        route: Slug::from_route(route),
        area: area.name.clone(),
        title: area.display_title().to_string(),
    })
}

fn build_area_pages(index: &ContentIndex, area: &AreaConfig) -> Vec<PageDescriptor> {
    let docs = index.query(&area_query(area));
    debug!(area = %area.name, documents = docs.len(), "building area pages");

    let title = area.display_title().to_string();
    let neighbors = match area.template {
        AreaTemplate::BlogPost => link_posts(&docs),
        AreaTemplate::Landing => vec![Neighbors::default(); docs.len()],
    };
    let template = match area.template {
        AreaTemplate::BlogPost => TemplateId::BlogPost,
        AreaTemplate::Landing => TemplateId::Landing,
    };

    docs.iter()
        .zip(neighbors)
        .map(|(doc, links)| PageDescriptor {
            route: doc.slug.clone(),
            template,
            context: PageContext {
                slug: doc.slug.clone(),
                area: area.name.clone(),
                title: title.clone(),
                previous: links.previous,
                next: links.next,
            },
        })
        .collect()
}

/// Reject two outputs that would be written to the same file.
///
/// Each output is a `(route, producer)` pair. Routes are compared by the file
/// they map to, so `/blog/` and `blog/index.html` collide.
pub fn check_outputs<'a>(
    outputs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), PageError> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::new();
    for (route, producer) in outputs {
        let file = route_to_output_path(route, Path::new(""));
        if let Some(first) = seen.insert(file, producer) {
            return Err(PageError::DuplicateRoute {
                route: route.to_string(),
                first: first.to_string(),
                second: producer.to_string(),
            });
        }
    }
    Ok(())
}

/// Documents whose area produces no pages.
///
/// Documents without an `area` never match any query. Documents whose area
/// is neither in the table nor in `extra_areas` (e.g. callout-only areas)
/// are just as unreachable.
pub fn orphans<'a>(
    index: &'a ContentIndex,
    areas: &[AreaConfig],
    extra_areas: &[&str],
) -> Vec<&'a ContentDocument> {
    index
        .documents()
        .iter()
        .filter(|doc| match doc.area() {
            None => true,
            Some(name) => {
                !areas.iter().any(|area| area.name == name) && !extra_areas.contains(&name)
            }
        })
        .collect()
}
