//! [`View`] writing the preview as a standalone HTML page.

use parking_lot::Mutex;
use preview_core::image_sources::rewrite_image_sources;
use preview_core::{PreviewError, Section, ServerControls, ServerState, View, ViewContext};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Height of a line of the generated page in pixels, used to estimate the
/// content height.
const LINE_HEIGHT: f64 = 24.0;

const STYLE: &str = r#"
body { max-width: 48rem; margin: 0 auto; padding: 1rem; font-family: sans-serif; line-height: 1.5; }
.controls { position: sticky; top: 0; padding: 0.25rem 0; background: #fff; border-bottom: 1px solid #ddd; font-size: 0.85rem; }
.controls .running { color: #2a7; }
.failure { padding: 0.5rem; background: #fee; border: 1px solid #c33; }
section.exercise { border-left: 3px solid #37c; padding-left: 1rem; }
pre { background: #f6f8fa; padding: 0.5rem; overflow-x: auto; }
"#;

#[derive(Debug)]
struct PageState {
    context: ViewContext,
    scroll: f64,
    content_height: f64,
    failure: Option<String>,
}

#[derive(Debug)]
pub struct HtmlFileView {
    output: PathBuf,
    /// `file://` URL relative image sources are resolved against.
    base_url: String,
    state: Mutex<PageState>,
}

impl HtmlFileView {
    pub fn new(output: PathBuf, base_url: String, auto_scroll: bool) -> Self {
        Self {
            output,
            base_url,
            state: Mutex::new(PageState {
                context: ViewContext {
                    auto_scroll,
                    sections: Vec::new(),
                    server: ServerControls::new(ServerState::Stopped),
                },
                scroll: 0.0,
                content_height: 0.0,
                failure: None,
            }),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn write_page(&self, state: &PageState) {
        let page = render_page(state, &self.base_url);
        if let Err(err) = std::fs::write(&self.output, page) {
            tracing::error!(?err, path = ?self.output, "Failed to write the preview page");
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_section(section: &Section, base_url: &str, out: &mut String) {
    let content = rewrite_image_sources(section.html(), base_url);
    match section {
        Section::Normal { .. } => {
            let _ = writeln!(out, "<section class=\"normal\">\n{content}</section>");
        }
        Section::Exercise { code, .. } => {
            let language = escape_html(&code.language);
            let _ = writeln!(
                out,
                "<section class=\"exercise\" data-language=\"{language}\">\n{content}"
            );
            let snippets = [
                ("context", code.context.as_deref()),
                ("base", Some(code.base.as_str())),
                ("solution", Some(code.solution.as_str())),
                ("validation", Some(code.validation.as_str())),
            ];
            for (kind, snippet) in snippets {
                if let Some(snippet) = snippet {
                    let _ = writeln!(
                        out,
                        "<pre class=\"{kind}\"><code class=\"language-{language}\">{}</code></pre>",
                        escape_html(snippet)
                    );
                }
            }
            out.push_str("</section>\n");
        }
    }
}

fn render_body(state: &PageState, base_url: &str) -> String {
    let context = &state.context;
    let mut body = String::new();

    let server_class = if context.server.start_highlighted {
        "running"
    } else {
        "stopped"
    };
    let _ = write!(
        body,
        "<div class=\"controls\">auto-scroll: {} | <span class=\"{server_class}\">{}</span>",
        if context.auto_scroll { "on" } else { "off" },
        context.server.start_label,
    );
    if context.server.stop_visible {
        body.push_str(" | Stop Preview Server");
    }
    body.push_str("</div>\n");

    if let Some(failure) = &state.failure {
        let _ = writeln!(body, "<div class=\"failure\">{}</div>", escape_html(failure));
    }

    body.push_str("<main>\n");
    for section in &context.sections {
        render_section(section, base_url, &mut body);
    }
    body.push_str("</main>\n");

    body
}

fn render_page(state: &PageState, base_url: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Live Preview</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{}<script>window.scrollTo(0, {});</script>\n\
         </body>\n</html>\n",
        render_body(state, base_url),
        state.scroll.round()
    )
}

impl View for HtmlFileView {
    fn refresh(&self, context: &ViewContext) {
        let mut state = self.state.lock();
        state.context = context.clone();
        state.failure = None;
        let lines = render_body(&state, &self.base_url).lines().count();
        state.content_height = lines as f64 * LINE_HEIGHT;
        self.write_page(&state);
        tracing::debug!(
            sections = context.sections.len(),
            content_height = state.content_height,
            "Preview page refreshed"
        );
    }

    fn content_height(&self) -> f64 {
        self.state.lock().content_height
    }

    fn scroll_to(&self, offset: f64) {
        let mut state = self.state.lock();
        state.scroll = offset;
        self.write_page(&state);
    }

    fn update_server_controls(&self, controls: &ServerControls) {
        let mut state = self.state.lock();
        state.context.server = controls.clone();
        self.write_page(&state);
        println!("server: {}", controls.start_label);
    }

    fn update_auto_scroll(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.context.auto_scroll = enabled;
        self.write_page(&state);
        println!("auto-scroll: {}", if enabled { "on" } else { "off" });
    }

    fn report_failure(&self, error: &PreviewError) {
        let mut state = self.state.lock();
        state.failure = Some(error.to_string());
        self.write_page(&state);
        eprintln!("preview not updated: {error}");
    }
}
