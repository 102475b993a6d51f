use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use super::document::ContentDocument;
use super::markdown::{PAGE_EXCERPT_LENGTH, excerpt};
use super::nav::NavSection;
use super::pagination::BlogLink;
use super::slug::Slug;
use crate::config::{RootConfig, ThemeConfig};
use crate::util::display_date;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("theme not found: {0}")]
    ThemeNotFound(String),
}

/// Templates of the built-in theme, compiled into the binary.
const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    (
        "base.html",
        include_str!("../../themes/default/templates/base.html"),
    ),
    (
        "landing.html",
        include_str!("../../themes/default/templates/landing.html"),
    ),
    (
        "blog-post.html",
        include_str!("../../themes/default/templates/blog-post.html"),
    ),
    (
        "area-index.html",
        include_str!("../../themes/default/templates/area-index.html"),
    ),
    (
        "index.html",
        include_str!("../../themes/default/templates/index.html"),
    ),
    (
        "404.html",
        include_str!("../../themes/default/templates/404.html"),
    ),
];

/// The template renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create a new renderer loading templates from the given theme directory.
    pub fn new(theme_path: &Path) -> Result<Self, RenderError> {
        let templates_path = theme_path.join("templates");
        if !templates_path.exists() {
            return Err(RenderError::ThemeNotFound(
                theme_path.display().to_string(),
            ));
        }

        let glob = templates_path.join("**/*.html");
        let glob_str = glob.to_string_lossy();
        let tera = Tera::new(&glob_str)?;

        Ok(Self { tera })
    }

    /// Create a renderer using the built-in theme.
    pub fn builtin() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES)?;
        Ok(Self { tera })
    }

    /// The on-disk theme if one is configured, otherwise the built-in one.
    pub fn from_config(theme: &ThemeConfig, base_path: &Path) -> Result<Self, RenderError> {
        match &theme.path {
            Some(path) if path.is_relative() => Self::new(&base_path.join(path)),
            Some(path) => Self::new(path),
            None => Self::builtin(),
        }
    }

    /// Render a template with the given context.
    pub fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError> {
        let tera_context = Context::from_serialize(context)?;
        Ok(self.tera.render(template, &tera_context)?)
    }
}

// =============================================================================
// Template context
// =============================================================================

/// Context passed to every template.
///
/// Fields that don't apply to a page are left empty (`content` on listing
/// pages, `posts` on document pages, and so on).
#[derive(Debug, Serialize)]
pub struct TemplateContext {
    pub site: SiteContext,
    pub page: PageInfo,
    /// Rendered body HTML, inserted unescaped by the templates
    pub content: String,
    pub nav: Vec<NavSection>,
    pub previous: Option<BlogLink>,
    pub next: Option<BlogLink>,
    pub posts: Vec<PostSummary>,
    pub callouts: Vec<Callout>,
    /// Theme settings from config, accessible as `theme.*` in templates
    pub theme: serde_json::Value,
}

impl TemplateContext {
    pub fn new(site: SiteContext, page: PageInfo, theme: serde_json::Value) -> Self {
        Self {
            site,
            page,
            content: String::new(),
            nav: Vec::new(),
            previous: None,
            next: None,
            posts: Vec::new(),
            callouts: Vec::new(),
            theme,
        }
    }
}

/// Site-level information.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    /// Absolute URL of the RSS feed, when one is written
    pub feed_url: Option<String>,
}

impl SiteContext {
    pub fn from_config(config: &RootConfig, feed_url: Option<String>) -> Self {
        Self {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            url: config.site.url.clone(),
            feed_url,
        }
    }
}

/// Information about the current page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub slug: String,
    pub area: Option<String>,
    /// Display label of the page's area
    pub area_title: Option<String>,
    pub section: Option<String>,
    /// Display date, e.g. "March 01, 2021"
    pub date: Option<String>,
    /// RFC 3339 date for `<time datetime>`
    pub date_iso: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Custom front matter fields
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl PageInfo {
    /// Page info for a generated page with no backing document.
    pub fn generated(title: &str, slug: &Slug) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    /// Page info for a document.
    ///
    /// `default_author` fills in a missing byline; pass `None` for pages that
    /// don't show one.
    pub fn from_document(doc: &ContentDocument, default_author: Option<&str>) -> Self {
        let fm = &doc.front_matter;
        Self {
            title: doc.title(),
            slug: doc.slug.to_string(),
            area: fm.area.clone(),
            area_title: None,
            section: fm.section.clone(),
            date: fm.date.as_ref().map(display_date),
            date_iso: fm.date.as_ref().map(|d| d.to_rfc3339()),
            author: fm
                .author
                .clone()
                .or_else(|| default_author.map(String::from)),
            description: Some(
                fm.description
                    .clone()
                    .unwrap_or_else(|| excerpt(&doc.body, PAGE_EXCERPT_LENGTH)),
            ),
            extra: fm.extra.clone(),
        }
    }
}

/// A document in a listing (area index, home callouts).
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: Slug,
    pub title: String,
    pub date: Option<String>,
    pub author: Option<String>,
    /// Front matter description, or an excerpt of the body
    pub description: String,
}

impl PostSummary {
    pub fn from_document(doc: &ContentDocument, default_author: &str) -> Self {
        let fm = &doc.front_matter;
        Self {
            slug: doc.slug.clone(),
            title: doc.title(),
            date: fm.date.as_ref().map(display_date),
            author: Some(fm.author.clone().unwrap_or_else(|| default_author.to_string())),
            description: fm
                .description
                .clone()
                .unwrap_or_else(|| excerpt(&doc.body, PAGE_EXCERPT_LENGTH)),
        }
    }
}

/// A named list of documents on the home page.
#[derive(Debug, Clone, Serialize)]
pub struct Callout {
    pub name: String,
    pub items: Vec<PostSummary>,
}
