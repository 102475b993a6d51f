//! Markdown rendering and plain-text excerpts.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Excerpt length for pages and listings.
pub const PAGE_EXCERPT_LENGTH: usize = 160;

/// Excerpt length for feed items.
pub const FEED_EXCERPT_LENGTH: usize = 140;

/// Translate configured extension names into parser options.
pub fn parse_extensions(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "smart_punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// Render markdown to HTML.
///
/// Headings without an explicit `{#id}` get one generated from their text,
/// made unique within the document. Explicit ids are reserved up front, so a
/// generated id never repeats one that appears later. Fenced code blocks keep their
/// `language-*` class for client-side highlighting.
pub fn render_markdown(
    markdown: &str,
    markdown_config: &MarkdownConfig,
) -> Result<String, MarkdownError> {
    let options = parse_extensions(markdown_config)?;
    let parsed: Vec<Event> = Parser::new_ext(markdown, options).collect();

    let mut used_heading_ids: HashSet<String> = parsed
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    // Events of the heading currently being read, start tag first
    let mut heading: Option<Vec<Event>> = None;
    let mut events: Vec<Event> = Vec::new();

    for event in parsed {
        match event {
            Event::Start(Tag::Heading { ref id, .. }) => {
                if id.is_some() {
                    events.push(event);
                } else {
                    heading = Some(vec![event]);
                }
            }
            Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                let mut buffered = heading.take().unwrap_or_default();
                let id = unique_id(&heading_text(&buffered[1..]), &mut used_heading_ids);
                if let Some(Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                })) = buffered.first().cloned()
                {
                    buffered[0] = Event::Start(Tag::Heading {
                        level,
                        id: Some(CowStr::from(id)),
                        classes,
                        attrs,
                    });
                }
                events.extend(buffered);
                events.push(event);
            }
            other => match heading.as_mut() {
                Some(buffered) => buffered.push(other),
                None => events.push(other),
            },
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    Ok(html_output)
}

fn heading_text(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) | Event::Code(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect()
}

fn unique_id(text: &str, used: &mut HashSet<String>) -> String {
    let base_id = slugify(text);
    let mut id = base_id.clone();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{}-{}", base_id, suffix);
        suffix += 1;
    }
    used.insert(id.clone());
    id
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}

/// Plain-text excerpt of a markdown body.
///
/// Code blocks and raw HTML are skipped. Text longer than `limit` characters
/// is cut at the last word boundary and ends with `…`.
pub fn excerpt(markdown: &str, limit: usize) -> String {
    let mut text = String::new();
    let mut in_code_block = false;

    let options = Options::ENABLE_GFM | Options::ENABLE_SMART_PUNCTUATION;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(t) | Event::Code(t) if !in_code_block => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => text.push(' '),
            _ => {}
        }
    }

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= limit {
        return text;
    }

    // Leave room for the ellipsis
    let max = limit.saturating_sub(1);
    let cut: String = text.chars().take(max).collect();
    let at_boundary = text.chars().nth(max).is_some_and(char::is_whitespace);
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > 0 && !at_boundary => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("BEM Naming"), "bem-naming");
    }

    #[test]
    fn test_render_basic_markdown() {
        let config = MarkdownConfig::default();
        let html = render_markdown("# Hello\n\nWorld", &config).unwrap();

        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn test_render_duplicate_headings() {
        let config = MarkdownConfig::default();
        let html = render_markdown("## Usage\n\n## Usage", &config).unwrap();

        assert!(html.contains("id=\"usage\""));
        assert!(html.contains("id=\"usage-1\""));
    }

    #[test]
    fn test_render_heading_keeps_inline_markup() {
        let config = MarkdownConfig::default();
        let html = render_markdown("## The `block` element", &config).unwrap();

        assert!(html.contains("id=\"the-block-element\""));
        assert!(html.contains("<code>block</code>"));
    }

    #[test]
    fn test_render_explicit_heading_id() {
        let config = MarkdownConfig::default();
        let html = render_markdown("## Intro {#start}\n\n## Start", &config).unwrap();

        assert!(html.contains("id=\"start\""));
        assert!(html.contains("id=\"start-1\""));
    }

    #[test]
    fn test_render_explicit_heading_id_after_generated() {
        let config = MarkdownConfig::default();
        let html = render_markdown("## Start\n\n## Intro {#start}", &config).unwrap();

        assert_eq!(html.matches("id=\"start\"").count(), 1);
        assert!(html.contains("<h2 id=\"start-1\">Start</h2>"));
        assert!(html.contains("<h2 id=\"start\">Intro</h2>"));
    }

    #[test]
    fn test_render_code_block_language_class() {
        let config = MarkdownConfig::default();
        let html = render_markdown("```scss\n.block { }\n```", &config).unwrap();

        assert!(html.contains("<pre><code class=\"language-scss\">"));
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
        };

        let result = render_markdown("# Test", &config);
        assert!(matches!(result, Err(MarkdownError::InvalidExtension(_))));
    }

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(
            excerpt("# Title\n\nSome *short* text.", 160),
            "Title Some short text."
        );
    }

    #[test]
    fn test_excerpt_skips_code() {
        let md = "Intro paragraph.\n\n```js\nconsole.log('hidden');\n```\n\nOutro.";
        assert_eq!(excerpt(md, 160), "Intro paragraph. Outro.");
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let md = "The quick brown fox jumps over the lazy dog";
        let result = excerpt(md, 20);

        assert_eq!(result, "The quick brown fox…");
        assert!(result.chars().count() <= 20);
    }
}
