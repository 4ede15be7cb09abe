//! Parser adapter: raw document content to ordered HTML sections.
//!
//! Rendering is a two-stage pipeline:
//! - [`lex`]: the content is parsed and split into sections, exercises are
//!   recognized.
//! - [`page`]: every section is turned into an HTML fragment, relative links
//!   and images being resolved against the document directory.
//!
//! A failure in either stage aborts the whole render with a single
//! [`ParseFailure`]. Nothing is cached, every call is independent.

mod lex;
mod output;
mod page;

use crate::document::DocumentRef;
use crate::error::ParseFailure;
use pulldown_cmark::Options;

pub use self::lex::{lex, Lexed, LexedSection};
pub use self::output::{ExerciseCode, Section};
pub use self::page::{page, PageOptions};

/// Options for the markdown extensions recognized by the lexer.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub enable_tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub enable_strikethrough: bool,
    /// Enable task list items ([x] and [ ])
    pub enable_tasklists: bool,
    /// Enable footnotes ([^1])
    pub enable_footnotes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_tables: true,
            enable_strikethrough: true,
            enable_tasklists: true,
            enable_footnotes: true,
        }
    }
}

impl RenderOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.enable_tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.enable_footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

/// Renders `content` of the document at `path` into ordered sections.
///
/// # Example
///
/// ```
/// use preview_core::render::{render_sections, RenderOptions};
///
/// let sections = render_sections("index.md", "# Hello\n\nWorld", &RenderOptions::default()).unwrap();
/// assert_eq!(sections.len(), 1);
/// assert!(sections[0].html().contains("<h1>Hello</h1>"));
/// ```
pub fn render_sections(
    path: &str,
    content: &str,
    options: &RenderOptions,
) -> Result<Vec<Section>, ParseFailure> {
    let lexed = lex(content, options).map_err(ParseFailure::lex)?;
    let page_options = PageOptions::for_dir(DocumentRef::new(path).dir());
    page(lexed, &page_options).map_err(ParseFailure::page)
}

/// The parser adapter seen by the preview controller.
#[async_trait::async_trait]
pub trait SectionRenderer: Send + Sync {
    async fn render(&self, path: &str, content: String) -> Result<Vec<Section>, ParseFailure>;
}

/// Markdown [`SectionRenderer`], running the stages on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

#[async_trait::async_trait]
impl SectionRenderer for MarkdownRenderer {
    async fn render(&self, path: &str, content: String) -> Result<Vec<Section>, ParseFailure> {
        let path = path.to_string();
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || render_sections(&path, &content, &options))
            .await
            .map_err(ParseFailure::page)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseStage;

    fn strip_newlines(html: &str) -> String {
        html.replace('\n', "")
    }

    #[test]
    fn test_title_and_paragraph() {
        let sections =
            render_sections("index.md", "# Title\n\nHello", &RenderOptions::default()).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            strip_newlines(sections[0].html()),
            "<h1>Title</h1><p>Hello</p>"
        );
    }

    #[test]
    fn test_section_order_is_preserved() {
        let content = "one\n\n---\n\ntwo\n\n---\n\nthree\n";
        let sections = render_sections("index.md", content, &RenderOptions::default()).unwrap();
        let html: Vec<_> = sections.iter().map(|s| strip_newlines(s.html())).collect();
        assert_eq!(html, ["<p>one</p>", "<p>two</p>", "<p>three</p>"]);
    }

    #[test]
    fn test_relative_targets_use_document_dir() {
        let content = "![diagram](img/flow.png) see [next](next.md)";
        let sections =
            render_sections("guide/intro.md", content, &RenderOptions::default()).unwrap();
        let html = sections[0].html();
        assert!(html.contains(r#"src="guide/img/flow.png""#));
        assert!(html.contains(r#"href="guide/next.html""#));
    }

    #[test]
    fn test_failures_carry_their_stage() {
        let err = render_sections("index.md", "```\nopen", &RenderOptions::default()).unwrap_err();
        assert_eq!(err.stage, ParseStage::Lex);

        let err = render_sections("index.md", "![x](../x.png)", &RenderOptions::default())
            .unwrap_err();
        assert_eq!(err.stage, ParseStage::Page);
    }

    #[tokio::test]
    async fn test_markdown_renderer_offloads() {
        let renderer = MarkdownRenderer::default();
        let sections = renderer
            .render("index.md", "# Title\n\nHello".to_string())
            .await
            .unwrap();
        assert_eq!(
            sections,
            vec![Section::normal("<h1>Title</h1>\n<p>Hello</p>\n")]
        );
    }
}
