//! Configuration type definitions.
//!
//! This module contains all the data structures used in `areagen.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::build::index::{Field, SortKey};

// =============================================================================
// Root config
// =============================================================================

/// The full site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    /// The area table: one entry per category that produces pages
    #[serde(default = "default_areas")]
    pub areas: Vec<AreaConfig>,
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            content: ContentConfig::default(),
            areas: default_areas(),
            home: HomeConfig::default(),
            feed: FeedConfig::default(),
            theme: ThemeConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl RootConfig {
    /// Find an area entry by name (exact match).
    pub fn area(&self, name: &str) -> Option<&AreaConfig> {
        self.areas.iter().find(|area| area.name == name)
    }
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Absolute site URL, required for the RSS feed
    pub url: Option<String>,
    /// Site owner, used as the feed's managing editor
    pub author: Option<String>,
    /// Byline for blog posts without an `author`
    #[serde(default = "default_author")]
    pub default_author: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            description: String::new(),
            url: None,
            author: None,
            default_author: default_author(),
            output: default_output(),
        }
    }
}

fn default_site_title() -> String {
    "Development Standards".to_string()
}

fn default_author() -> String {
    "The Team".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

// =============================================================================
// Content configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Content root, relative to the config file
    #[serde(default = "default_content_path")]
    pub path: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: default_content_path(),
        }
    }
}

fn default_content_path() -> PathBuf {
    PathBuf::from("content")
}

// =============================================================================
// Area table
// =============================================================================

/// Which template an area's documents render with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaTemplate {
    #[default]
    Landing,
    BlogPost,
}

/// One entry of the area table.
///
/// ```yaml
/// areas:
///   - name: CSS
///   - name: Blog
///     template: blog_post
///     index: /blog/
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaConfig {
    /// Value of the `area` front matter field selecting documents
    pub name: String,
    /// Display label for the area's pages (defaults to `name`)
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template: AreaTemplate,
    /// Route of a listing page for the whole area, e.g. `/blog/`
    #[serde(default)]
    pub index: Option<String>,
    /// Sort order of the side navigation
    #[serde(default = "default_nav_sort")]
    pub nav_sort: Vec<SortKey>,
}

impl AreaConfig {
    pub fn landing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            template: AreaTemplate::Landing,
            index: None,
            nav_sort: default_nav_sort(),
        }
    }

    pub fn blog(name: &str, index: &str) -> Self {
        Self {
            template: AreaTemplate::BlogPost,
            index: Some(index.to_string()),
            ..Self::landing(name)
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

fn default_nav_sort() -> Vec<SortKey> {
    vec![SortKey::asc(Field::Section), SortKey::asc(Field::Title)]
}

fn default_areas() -> Vec<AreaConfig> {
    let mut areas: Vec<AreaConfig> = [
        "Accessibility",
        "Automated Testing",
        "CSS",
        "Git",
        "HTML",
        "Javascript",
        "Performance",
        "Quality Assurance",
        "SASS",
        "SEO",
    ]
    .into_iter()
    .map(AreaConfig::landing)
    .collect();
    areas.push(AreaConfig::blog("Blog", "/blog/"));
    areas
}

// =============================================================================
// Home page
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub callouts: Vec<CalloutConfig>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            callouts: Vec::new(),
        }
    }
}

/// A named list on the home page: documents matching both `area` and
/// `section`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutConfig {
    pub name: String,
    pub area: String,
    pub section: String,
}

// =============================================================================
// Feed
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Output path relative to the site root
    #[serde(default = "default_feed_path")]
    pub path: String,
    /// Channel title (defaults to the site title)
    #[serde(default)]
    pub title: Option<String>,
    /// Area the feed is built from
    #[serde(default = "default_feed_area")]
    pub area: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_feed_path(),
            title: None,
            area: default_feed_area(),
        }
    }
}

fn default_feed_path() -> String {
    "rss.xml".to_string()
}

fn default_feed_area() -> String {
    "Blog".to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Theme configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// On-disk theme directory (uses the built-in theme when unset)
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Arbitrary settings passed to templates as `theme.*`
    #[serde(default)]
    pub settings: serde_json::Value,
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "smart_punctuation".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}
