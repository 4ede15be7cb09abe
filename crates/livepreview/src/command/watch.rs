use super::locate_document;
use crate::browser::{BrowserServer, BrowserShell};
use crate::html_view::HtmlFileView;
use anyhow::{anyhow, Result};
use clap::Parser;
use parking_lot::Mutex;
use preview_config::Config;
use preview_core::image_sources::file_url;
use preview_core::{
    Collaborators, DocumentWatcher, Editor, FsDocumentStore, LinkAction, MarkdownRenderer,
    PreviewController, PreviewSettings, WatcherConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Keeps the HTML preview of a document up to date.
///
/// Commands are read from stdin, one per line:
///   - scroll <offset> <height>: editor scroll position used by the next render.
///   - toggle-scroll: toggle auto-scroll.
///   - reload: render the document right away.
///   - start: start the preview server, or open the current page if it runs.
///   - stop: stop the preview server.
///   - open <href>: activate a link of the preview.
///   - quit
#[derive(Parser, Debug, Clone)]
pub struct Watch {
    /// Document to preview.
    path: PathBuf,

    /// Project root the document path is relative to.
    ///
    /// Defaults to the directory containing the document.
    #[clap(long)]
    root: Option<PathBuf>,

    /// Where the preview page is written.
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Scroll { offset: f64, height: f64 },
    ToggleScroll,
    Reload,
    Start,
    Stop,
    Open(String),
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "scroll" => {
                let mut numbers = rest.split_whitespace().map(str::parse::<f64>);
                match (numbers.next(), numbers.next(), numbers.next()) {
                    (Some(Ok(offset)), Some(Ok(height)), None) => Self::Scroll { offset, height },
                    _ => return Err(anyhow!("usage: scroll <offset> <height>")),
                }
            }
            "toggle-scroll" => Self::ToggleScroll,
            "reload" => Self::Reload,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "open" if !rest.is_empty() => Self::Open(rest.to_string()),
            "open" => return Err(anyhow!("usage: open <href>")),
            "quit" => Self::Quit,
            _ => return Err(anyhow!("unknown command: {line}")),
        };

        Ok(command)
    }
}

/// Editor position as last reported on stdin.
#[derive(Debug, Default)]
struct ReportedEditor {
    /// `(offset, height)`
    position: Mutex<(f64, f64)>,
}

impl Editor for ReportedEditor {
    fn scroll_offset(&self) -> f64 {
        self.position.lock().0
    }

    fn content_height(&self) -> f64 {
        self.position.lock().1
    }
}

impl Watch {
    pub async fn run(self, config: &Config) -> Result<()> {
        let (root, document) = locate_document(&self.path, self.root.as_deref())?;

        let output = self
            .output
            .unwrap_or_else(|| std::env::temp_dir().join("livepreview.html"));
        let output = if output.is_absolute() {
            output
        } else {
            std::env::current_dir()?.join(output)
        };

        let editor = Arc::new(ReportedEditor::default());
        let view = Arc::new(HtmlFileView::new(
            output,
            file_url(&root),
            config.preview.auto_scroll,
        ));
        let server = Arc::new(BrowserServer::new(
            file_url(view.output()),
            config.server.open_browser,
        ));

        let collaborators = Collaborators {
            editor: editor.clone(),
            store: Arc::new(FsDocumentStore::new(root.clone())),
            renderer: Arc::new(MarkdownRenderer::default()),
            server,
            shell: Arc::new(BrowserShell),
            view: view.clone(),
        };
        let settings = PreviewSettings {
            debounce: config.preview.debounce(),
            auto_scroll: config.preview.auto_scroll,
        };

        let (handle, controller) = PreviewController::spawn(collaborators, settings);

        let watcher = DocumentWatcher::new(
            &root,
            document.clone(),
            handle.clone(),
            WatcherConfig::default(),
        )?;

        tracing::info!(
            root = ?root,
            path = document.path(),
            output = ?view.output(),
            backend = ?watcher.backend(),
            "Watching document"
        );
        println!("writing preview of {} to {}", document.path(), view.output().display());

        handle.opened(document.clone());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };

            tracing::trace!(?command, "Received command");

            match command {
                Command::Scroll { offset, height } => {
                    *editor.position.lock() = (offset, height);
                }
                Command::ToggleScroll => handle.toggle_auto_scroll(),
                Command::Reload => handle.opened(document.clone()),
                Command::Start => handle.request_server_start(),
                Command::Stop => handle.request_server_stop(),
                Command::Open(href) => match handle.on_link_activated(&href) {
                    LinkAction::OpenedExternally => println!("opened externally: {href}"),
                    LinkAction::Default => println!("navigate: {href}"),
                },
                Command::Quit => break,
            }
        }

        drop(watcher);
        drop(handle);

        controller.await?;

        Ok(())
    }
}
