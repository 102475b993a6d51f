use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{AreaConfig, AreaTemplate, ConfigError, RootConfig};

use super::document::{ContentDocument, StaticFile};
use super::feed::{FeedError, absolute_url, build_feed};
use super::index::{ContentIndex, Field, Query, SortKey};
use super::markdown::{MarkdownError, render_markdown};
use super::nav::derive_nav;
use super::pages::{
    ListingPage, PageDescriptor, PageError, SitePages, TemplateId, area_query, build_pages,
    check_outputs, nav_query, orphans,
};
use super::paths::{resolve, route_to_output_path, staging_dir};
use super::render::{
    Callout, PageInfo, PostSummary, RenderError, Renderer, SiteContext, TemplateContext,
};
use super::slug::{Slug, SlugError};
use super::store::{ContentError, ContentStore};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("{0}")]
    Slug(#[from] SlugError),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("markdown error in {slug}: {source}")]
    Markdown { slug: Slug, source: MarkdownError },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("no document for route {0}")]
    MissingDocument(Slug),

    #[error("area '{0}' is not in the area table")]
    UnknownArea(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct BuildResult {
    pub output_dir: PathBuf,
    pub documents: usize,
    pub pages: usize,
    pub static_files: usize,
    /// Where the RSS feed was written, if one was
    pub feed: Option<PathBuf>,
}

/// A rendered file waiting to be written, keyed by its route.
struct RenderedFile {
    route: String,
    contents: String,
}

pub struct Builder {
    config: RootConfig,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
}

impl Builder {
    pub fn new(config: RootConfig, base_path: PathBuf) -> Self {
        Self { config, base_path }
    }

    /// Run one complete build.
    ///
    /// Everything is loaded and rendered in memory before anything touches
    /// the output directory. Files are written to a staging directory that
    /// replaces the output directory only once every write succeeded, so a
    /// failed build leaves the previous output in place.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        self.config.validate_output(&self.base_path)?;

        // Step 1: Load the content store
        let content_root = resolve(&self.base_path, &self.config.content.path);
        let store = ContentStore::load(&content_root)?;
        let static_files = store.static_files;

        // Step 2: Index it (rejects slug collisions)
        let index = ContentIndex::new(store.documents)?;
        if index.is_empty() {
            warn!(path = %content_root.display(), "no markdown documents found");
        }
        info!(
            documents = index.len(),
            static_files = static_files.len(),
            "loaded content"
        );
        self.report_orphans(&index);

        // Step 3: Page descriptors from the area table
        let pages = build_pages(&index, &self.config.areas)?;
        self.check_site_outputs(&pages, &static_files)?;
        info!(pages = pages.page_count(), "built page descriptors");

        // Step 4: Render everything in memory
        let renderer = Renderer::from_config(&self.config.theme, &self.base_path)?;
        let feed_url = self.feed_url();
        let site = SiteContext::from_config(&self.config, feed_url.clone());

        let mut rendered = Vec::with_capacity(pages.page_count() + 2);
        for page in &pages.documents {
            rendered.push(self.render_page(page, &index, &renderer, &site)?);
        }
        for listing in &pages.listings {
            rendered.push(self.render_listing(listing, &index, &renderer, &site)?);
        }
        if self.config.home.enabled {
            rendered.push(self.render_home(&index, &renderer, &site)?);
        }
        rendered.push(self.render_not_found(&renderer, &site)?);

        let feed = build_feed(&self.config, &index)?;

        // Step 5: Write to staging, then swap it in
        let output_dir = self.output_dir();
        let staging = staging_dir(&output_dir);
        let written = self.write_staging(
            &staging,
            &content_root,
            &static_files,
            &rendered,
            feed.as_deref(),
        );
        if let Err(e) = written {
            // Leave the previous output alone
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir)?;
        }
        std::fs::rename(&staging, &output_dir)?;

        let feed_path = feed
            .is_some()
            .then(|| route_to_output_path(&self.config.feed.path, &output_dir));
        info!(output = %output_dir.display(), files = rendered.len(), "wrote site");

        Ok(BuildResult {
            output_dir,
            documents: index.len(),
            pages: rendered.len(),
            static_files: static_files.len(),
            feed: feed_path,
        })
    }

    /// Warn about documents that no area will ever render.
    fn report_orphans(&self, index: &ContentIndex) {
        let callout_areas: Vec<&str> = self
            .config
            .home
            .callouts
            .iter()
            .map(|callout| callout.area.as_str())
            .collect();

        for doc in orphans(index, &self.config.areas, &callout_areas) {
            match doc.area() {
                None => warn!(
                    path = %doc.source_path.display(),
                    "document has no area and will not be rendered"
                ),
                Some(area) => warn!(
                    path = %doc.source_path.display(),
                    area,
                    "document's area is not in the area table and will not be rendered"
                ),
            }
        }
    }

    /// Every file of the build must come from exactly one producer. The home
    /// page owns `/` when it is enabled.
    fn check_site_outputs(
        &self,
        pages: &SitePages,
        static_files: &[StaticFile],
    ) -> Result<(), PageError> {
        let feed_route = self
            .config
            .feed
            .enabled
            .then(|| format!("/{}", self.config.feed.path.trim_start_matches('/')));
        let static_routes: Vec<String> = static_files
            .iter()
            .map(|file| format!("/{}", file.output_path.to_string_lossy().replace('\\', "/")))
            .collect();

        let mut outputs: Vec<(&str, &str)> = pages.routes().collect();
        if self.config.home.enabled {
            outputs.push(("/", "home"));
        }
        outputs.push(("/404.html", "404"));
        if let Some(route) = &feed_route {
            outputs.push((route.as_str(), "feed"));
        }
        outputs.extend(static_routes.iter().map(|route| (route.as_str(), "static file")));

        check_outputs(outputs)
    }

    fn render_page(
        &self,
        page: &PageDescriptor,
        index: &ContentIndex,
        renderer: &Renderer,
        site: &SiteContext,
    ) -> Result<RenderedFile, BuildError> {
        let area = self.area(&page.context.area)?;
        let theme = self.config.theme.settings.clone();
        debug!(route = %page.route, template = page.template.template_name(), "rendering page");

        let context = match page.template {
            TemplateId::Landing => {
                let doc = self.document(index, &page.route)?;
                let mut info = PageInfo::from_document(doc, None);
                info.area_title = Some(page.context.title.clone());

                let mut context = TemplateContext::new(site.clone(), info, theme);
                context.content = self.render_body(doc)?;
                context.nav = derive_nav(&index.query(&nav_query(area)));
                context
            }
            TemplateId::BlogPost => {
                let doc = self.document(index, &page.route)?;
                let mut info =
                    PageInfo::from_document(doc, Some(&self.config.site.default_author));
                info.area_title = Some(page.context.title.clone());

                let mut context = TemplateContext::new(site.clone(), info, theme);
                context.content = self.render_body(doc)?;
                context.previous = page.context.previous.clone();
                context.next = page.context.next.clone();
                context
            }
        };

        Ok(RenderedFile {
            route: page.route.to_string(),
            contents: renderer.render(page.template.template_name(), &context)?,
        })
    }

    fn render_listing(
        &self,
        listing: &ListingPage,
        index: &ContentIndex,
        renderer: &Renderer,
        site: &SiteContext,
    ) -> Result<RenderedFile, BuildError> {
        let area = self.area(&listing.area)?;
        debug!(route = %listing.route, "rendering area index");

        let mut info = PageInfo::generated(&listing.title, &listing.route);
        info.area = Some(area.name.clone());
        info.area_title = Some(listing.title.clone());

        let mut context =
            TemplateContext::new(site.clone(), info, self.config.theme.settings.clone());
        let default_author = &self.config.site.default_author;
        context.posts = index
            .query(&area_query(area))
            .into_iter()
            .map(|doc| PostSummary::from_document(doc, default_author))
            .collect();

        Ok(RenderedFile {
            route: listing.route.to_string(),
            contents: renderer.render(ListingPage::TEMPLATE, &context)?,
        })
    }

    fn render_home(
        &self,
        index: &ContentIndex,
        renderer: &Renderer,
        site: &SiteContext,
    ) -> Result<RenderedFile, BuildError> {
        let root = Slug::from_route("/");
        let info = PageInfo::generated(&self.config.site.title, &root);
        let mut context =
            TemplateContext::new(site.clone(), info, self.config.theme.settings.clone());

        // One card per area that has something to link to
        context.posts = self
            .config
            .areas
            .iter()
            .filter_map(|area| self.area_card(area, index))
            .collect();

        let default_author = &self.config.site.default_author;
        context.callouts = self
            .config
            .home
            .callouts
            .iter()
            .map(|callout| {
                let query = Query::new()
                    .filter(Field::Area, callout.area.clone())
                    .filter(Field::Section, callout.section.clone())
                    .sort(SortKey::asc(Field::Title));
                Callout {
                    name: callout.name.clone(),
                    items: index
                        .query(&query)
                        .into_iter()
                        .map(|doc| PostSummary::from_document(doc, default_author))
                        .collect(),
                }
            })
            .collect();

        Ok(RenderedFile {
            route: root.to_string(),
            contents: renderer.render("index.html", &context)?,
        })
    }

    /// Link target for an area on the home page: its index page if it has
    /// one, otherwise its first document.
    fn area_card(&self, area: &AreaConfig, index: &ContentIndex) -> Option<PostSummary> {
        let slug = match &area.index {
            Some(route) => Slug::from_route(route),
            None => {
                let query = match area.template {
                    AreaTemplate::Landing => nav_query(area),
                    AreaTemplate::BlogPost => area_query(area),
                };
                index.query(&query).first()?.slug.clone()
            }
        };
        Some(PostSummary {
            slug,
            title: area.display_title().to_string(),
            date: None,
            author: None,
            description: String::new(),
        })
    }

    fn render_not_found(
        &self,
        renderer: &Renderer,
        site: &SiteContext,
    ) -> Result<RenderedFile, BuildError> {
        let route = Slug::from_route("/404.html");
        let info = PageInfo::generated("Not found", &route);
        let context = TemplateContext::new(site.clone(), info, self.config.theme.settings.clone());
        Ok(RenderedFile {
            route: route.to_string(),
            contents: renderer.render("404.html", &context)?,
        })
    }

    fn render_body(&self, doc: &ContentDocument) -> Result<String, BuildError> {
        render_markdown(&doc.body, &self.config.markdown).map_err(|e| BuildError::Markdown {
            slug: doc.slug.clone(),
            source: e,
        })
    }

    fn write_staging(
        &self,
        staging: &Path,
        content_root: &Path,
        static_files: &[StaticFile],
        rendered: &[RenderedFile],
        feed: Option<&str>,
    ) -> Result<(), BuildError> {
        if staging.exists() {
            std::fs::remove_dir_all(staging)?;
        }
        std::fs::create_dir_all(staging)?;

        for file in static_files {
            let input_path = content_root.join(&file.source_path);
            let output_path = staging.join(&file.output_path);
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&input_path, &output_path)?;
        }

        for file in rendered {
            let output_path = route_to_output_path(&file.route, staging);
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, &file.contents)?;
        }

        if let Some(xml) = feed {
            let output_path = route_to_output_path(&self.config.feed.path, staging);
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, xml)?;
        }

        Ok(())
    }

    fn area(&self, name: &str) -> Result<&AreaConfig, BuildError> {
        self.config
            .area(name)
            .ok_or_else(|| BuildError::UnknownArea(name.to_string()))
    }

    fn document<'a>(
        &self,
        index: &'a ContentIndex,
        route: &Slug,
    ) -> Result<&'a ContentDocument, BuildError> {
        index
            .get(route)
            .ok_or_else(|| BuildError::MissingDocument(route.clone()))
    }

    fn feed_url(&self) -> Option<String> {
        if !self.config.feed.enabled {
            return None;
        }
        let site_url = self.config.site.url.as_deref()?;
        let route = format!("/{}", self.config.feed.path.trim_start_matches('/'));
        Some(absolute_url(site_url, &route))
    }

    /// Get the output directory path, resolved against base_path.
    fn output_dir(&self) -> PathBuf {
        resolve(&self.base_path, &self.config.site.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_site() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site")
    }

    async fn fixture_config(output: &Path) -> RootConfig {
        let mut config = RootConfig::load_from_file(&fixture_site().join("areagen.yaml"))
            .await
            .unwrap();
        config.site.output = output.to_path_buf();
        config
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
    }

    #[tokio::test]
    async fn test_build_fixture_site() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("_site");
        let config = fixture_config(&output).await;

        let result = Builder::new(config, fixture_site()).build().await.unwrap();

        assert_eq!(result.output_dir, output);
        assert_eq!(result.static_files, 1);
        assert!(result.feed.is_some());

        for file in [
            "index.html",
            "404.html",
            "rss.xml",
            "assets/logo.svg",
            "css/index.html",
            "css/naming/bem/index.html",
            "css/naming/prefixes/index.html",
            "css/architecture/itcss/index.html",
            "accessibility/index.html",
            "accessibility/aria/index.html",
            "blog/index.html",
            "blog/first-post/index.html",
            "blog/second-post/index.html",
            "blog/third-post/index.html",
        ] {
            assert!(output.join(file).exists(), "missing {}", file);
        }

        // Orphans and callout-only areas get no page
        assert!(!output.join("drafts/untitled/index.html").exists());
        assert!(!output.join("home/get-started/index.html").exists());
        assert!(!temp.path().join("_site.partial").exists());
    }

    #[tokio::test]
    async fn test_build_landing_nav_and_blog_links() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("_site");
        let config = fixture_config(&output).await;
        Builder::new(config, fixture_site()).build().await.unwrap();

        let bem = read(output.join("css/naming/bem/index.html"));
        let architecture = bem.find("Architecture").unwrap();
        let naming = bem.find("Naming").unwrap();
        assert!(architecture < naming);
        assert!(bem.contains("href=\"/css/naming/prefixes/\""));

        let second = read(output.join("blog/second-post/index.html"));
        assert!(second.contains("href=\"/blog/first-post/\" rel=\"prev\""));
        assert!(second.contains("href=\"/blog/third-post/\" rel=\"next\""));
        assert!(second.contains("February 01, 2021"));

        let newest = read(output.join("blog/third-post/index.html"));
        assert!(!newest.contains("rel=\"next\""));

        let blog_index = read(output.join("blog/index.html"));
        let third = blog_index.find("/blog/third-post/").unwrap();
        let first = blog_index.find("/blog/first-post/").unwrap();
        assert!(third < first);

        let home = read(output.join("index.html"));
        assert!(home.contains("Get Started"));
        assert!(home.contains("href=\"/home/get-started/\""));
    }

    #[tokio::test]
    async fn test_feed_matches_blog_pages() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("_site");
        let config = fixture_config(&output).await;
        Builder::new(config, fixture_site()).build().await.unwrap();

        let xml = read(output.join("rss.xml"));
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let links: Vec<_> = channel.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            links,
            vec![
                "https://standards.example.com/blog/third-post/",
                "https://standards.example.com/blog/second-post/",
                "https://standards.example.com/blog/first-post/",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_twice_is_identical() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("_site");

        let config = fixture_config(&output).await;
        Builder::new(config.clone(), fixture_site()).build().await.unwrap();
        let first = read(output.join("blog/second-post/index.html"));
        let first_feed = read(output.join("rss.xml"));

        Builder::new(config, fixture_site()).build().await.unwrap();
        assert_eq!(first, read(output.join("blog/second-post/index.html")));
        assert_eq!(first_feed, read(output.join("rss.xml")));
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_output() {
        let temp = tempfile::tempdir().unwrap();
        let content = temp.path().join("content");
        fs::create_dir_all(content.join("css/naming")).unwrap();
        fs::write(content.join("css/naming.md"), "---\narea: CSS\n---\nOne").unwrap();
        fs::write(content.join("css/naming/index.md"), "---\narea: CSS\n---\nTwo").unwrap();

        let output = temp.path().join("_site");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("marker.txt"), "previous build").unwrap();

        let config: RootConfig =
            serde_yaml::from_str("areas:\n  - name: CSS\nfeed:\n  enabled: false\n").unwrap();
        let result = Builder::new(config, temp.path().to_path_buf()).build().await;

        assert!(matches!(result, Err(BuildError::Slug(_))));
        assert_eq!(read(output.join("marker.txt")), "previous build");
        assert!(!temp.path().join("_site.partial").exists());
    }

    #[tokio::test]
    async fn test_output_inside_content_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let content = temp.path().join("content");
        fs::create_dir_all(content.join("css")).unwrap();
        fs::write(content.join("css/bem.md"), "---\narea: CSS\n---\nBlocks").unwrap();

        for output in ["content", ".", "content/_site"] {
            let mut config: RootConfig =
                serde_yaml::from_str("areas:\n  - name: CSS\nfeed:\n  enabled: false\n").unwrap();
            config.site.output = output.into();

            let result = Builder::new(config, temp.path().to_path_buf()).build().await;
            assert!(
                matches!(result, Err(BuildError::Config(ConfigError::Validation(_)))),
                "{}",
                output
            );
            assert_eq!(read(content.join("css/bem.md")), "---\narea: CSS\n---\nBlocks");
        }
        assert!(!content.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_feed_path_cannot_replace_a_page() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("_site");
        let mut config = fixture_config(&output).await;
        config.feed.path = "index.html".to_string();

        let result = Builder::new(config, fixture_site()).build().await;
        match result {
            Err(BuildError::Page(PageError::DuplicateRoute { first, second, .. })) => {
                assert_eq!(first, "home");
                assert_eq!(second, "feed");
            }
            other => panic!("expected duplicate route, got {:?}", other.map(|r| r.output_dir)),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_static_file_cannot_replace_a_page() {
        let temp = tempfile::tempdir().unwrap();
        let content = temp.path().join("content");
        fs::create_dir_all(content.join("css/guide")).unwrap();
        fs::write(content.join("css/guide.md"), "---\narea: CSS\n---\nGuide").unwrap();
        fs::write(content.join("css/guide/index.html"), "<p>stale</p>").unwrap();

        let config: RootConfig =
            serde_yaml::from_str("areas:\n  - name: CSS\nfeed:\n  enabled: false\n").unwrap();
        let result = Builder::new(config, temp.path().to_path_buf()).build().await;
        assert!(matches!(result, Err(BuildError::Page(_))));
    }

    #[tokio::test]
    async fn test_home_route_is_reserved() {
        let temp = tempfile::tempdir().unwrap();
        let content = temp.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("index.md"), "---\narea: CSS\n---\nRoot").unwrap();

        let config: RootConfig =
            serde_yaml::from_str("areas:\n  - name: CSS\nfeed:\n  enabled: false\n").unwrap();
        let result = Builder::new(config.clone(), temp.path().to_path_buf()).build().await;
        assert!(matches!(result, Err(BuildError::Page(_))));

        let mut without_home = config;
        without_home.home.enabled = false;
        let result = Builder::new(without_home, temp.path().to_path_buf()).build().await;
        assert!(result.is_ok());
        assert!(temp.path().join("_site/index.html").exists());
    }
}
