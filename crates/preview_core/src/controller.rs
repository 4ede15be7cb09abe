//! The preview controller: decides when to re-render and applies results.
//!
//! The controller runs as a single task owning all the preview state. Document
//! changes, server intents and snapshots arrive through a [`PreviewHandle`],
//! server state through the server's watch channel, and finished renders
//! through an internal channel. Renders run in their own tasks and may overlap
//! in time, but only the outcome of the most recently initiated render for the
//! current document is ever applied: every render carries the generation it was
//! started with and is discarded if a newer one has been initiated since.

use crate::debounce::{ChangeDebouncer, ChangeSignal, DEFAULT_DEBOUNCE};
use crate::document::{DocumentRef, DocumentStore, Editor};
use crate::error::PreviewError;
use crate::render::{Section, SectionRenderer};
use crate::scroll;
use crate::server::{PreviewServer, ServerStateReflector};
use crate::view::{ServerControls, View, ViewContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Opens URLs outside of the preview.
pub trait Shell: Send + Sync {
    /// Fire-and-forget.
    fn open_external(&self, url: &str);
}

/// What the preview should do with an activated link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// The URL was handed to the shell, in-preview navigation must not happen.
    OpenedExternally,
    /// Not handled, navigation proceeds normally.
    Default,
}

/// Returns `true` for absolute `http`/`https` URLs, case-insensitively.
pub fn is_web_url(href: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        href.get(..scheme.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .unwrap_or(false)
    })
}

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub editor: Arc<dyn Editor>,
    pub store: Arc<dyn DocumentStore>,
    pub renderer: Arc<dyn SectionRenderer>,
    pub server: Arc<dyn PreviewServer>,
    pub shell: Arc<dyn Shell>,
    pub view: Arc<dyn View>,
}

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    /// Quiet window of `edited` signals.
    pub debounce: Duration,
    /// Initial auto-scroll state.
    pub auto_scroll: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            auto_scroll: true,
        }
    }
}

#[derive(Debug)]
enum ControllerEvent {
    Change(ChangeSignal),
    ToggleAutoScroll,
    StartServer,
    StopServer,
    Snapshot(oneshot::Sender<ViewContext>),
}

#[derive(Debug)]
struct RenderOutcome {
    generation: u64,
    document: DocumentRef,
    result: Result<Vec<Section>, PreviewError>,
}

/// Cheap, cloneable entry point of a running [`PreviewController`].
///
/// The controller exits once every handle is dropped.
#[derive(Clone)]
pub struct PreviewHandle {
    event_tx: UnboundedSender<ControllerEvent>,
    shell: Arc<dyn Shell>,
}

impl PreviewHandle {
    fn send(&self, event: ControllerEvent) {
        if let Err(err) = self.event_tx.send(event) {
            tracing::debug!(event = ?err.0, "Preview controller has exited, event dropped");
        }
    }

    /// The document was opened, render it right away.
    pub fn opened(&self, document: DocumentRef) {
        self.send(ControllerEvent::Change(ChangeSignal::Opened(document)));
    }

    /// The document was written, render it once the edits settle.
    pub fn edited(&self, document: DocumentRef) {
        self.send(ControllerEvent::Change(ChangeSignal::Edited(document)));
    }

    pub fn on_document_changed(&self, document: DocumentRef, is_open: bool) {
        if is_open {
            self.opened(document);
        } else {
            self.edited(document);
        }
    }

    /// Flips auto-scroll, effective from the next refresh.
    pub fn toggle_auto_scroll(&self) {
        self.send(ControllerEvent::ToggleAutoScroll);
    }

    pub fn request_server_start(&self) {
        self.send(ControllerEvent::StartServer);
    }

    pub fn request_server_stop(&self) {
        self.send(ControllerEvent::StopServer);
    }

    /// Web URLs are opened by the shell instead of navigating the preview.
    pub fn on_link_activated(&self, href: &str) -> LinkAction {
        if is_web_url(href) {
            self.shell.open_external(href);
            LinkAction::OpenedExternally
        } else {
            LinkAction::Default
        }
    }

    /// Current render-time context, `None` if the controller has exited.
    pub async fn snapshot(&self) -> Option<ViewContext> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerEvent::Snapshot(tx));
        rx.await.ok()
    }
}

pub struct PreviewController {
    collaborators: Collaborators,
    debouncer: ChangeDebouncer,
    current_document: Option<DocumentRef>,
    /// Generation of the most recently initiated render.
    generation: u64,
    /// Sections of the last successfully applied render.
    sections: Vec<Section>,
    auto_scroll: bool,
    server_state: ServerStateReflector,
    outcome_tx: UnboundedSender<RenderOutcome>,
}

impl PreviewController {
    /// Starts the controller task. Must be called within a tokio runtime.
    pub fn spawn(
        collaborators: Collaborators,
        settings: PreviewSettings,
    ) -> (PreviewHandle, JoinHandle<()>) {
        let (event_tx, event_rx) = unbounded_channel();
        let (outcome_tx, outcome_rx) = unbounded_channel();

        let handle = PreviewHandle {
            event_tx,
            shell: collaborators.shell.clone(),
        };

        let controller = Self {
            collaborators,
            debouncer: ChangeDebouncer::new(settings.debounce),
            current_document: None,
            generation: 0,
            sections: Vec::new(),
            auto_scroll: settings.auto_scroll,
            server_state: ServerStateReflector::default(),
            outcome_tx,
        };

        tracing::debug!(
            debounce = ?settings.debounce,
            auto_scroll = settings.auto_scroll,
            "Spawning preview controller"
        );

        let join_handle = tokio::spawn(controller.run(event_rx, outcome_rx));

        (handle, join_handle)
    }

    async fn run(
        mut self,
        mut event_rx: UnboundedReceiver<ControllerEvent>,
        mut outcome_rx: UnboundedReceiver<RenderOutcome>,
    ) {
        let mut server_rx = self.collaborators.server.subscribe();
        let mut server_alive = true;

        let running = *server_rx.borrow_and_update();
        self.server_state.apply(running);
        self.collaborators
            .view
            .update_server_controls(&ServerControls::new(self.server_state.state()));

        loop {
            tokio::select! {
                biased;

                Some(outcome) = outcome_rx.recv() => self.on_render_finished(outcome),
                changed = server_rx.changed(), if server_alive => {
                    match changed {
                        Ok(()) => {
                            let running = *server_rx.borrow_and_update();
                            self.on_server_state_changed(running);
                        }
                        Err(_) => {
                            tracing::debug!("Preview server notifications closed");
                            server_alive = false;
                        }
                    }
                }
                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event),
                        None => break, // every handle has been dropped.
                    }
                }
                maybe_document = self.debouncer.expired(), if self.debouncer.is_pending() => {
                    if let Some(document) = maybe_document {
                        self.initiate_render(document);
                    }
                }
            }
        }

        tracing::debug!(generation = self.generation, "Preview controller exited");
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Change(signal) => {
                if let Some(document) = self.debouncer.push(signal) {
                    self.initiate_render(document);
                }
            }
            ControllerEvent::ToggleAutoScroll => self.toggle_auto_scroll(),
            ControllerEvent::StartServer => self.request_server_start(),
            ControllerEvent::StopServer => self.request_server_stop(),
            ControllerEvent::Snapshot(tx) => {
                let _ = tx.send(self.view_context());
            }
        }
    }

    fn initiate_render(&mut self, document: DocumentRef) {
        self.generation += 1;
        let generation = self.generation;
        self.current_document.replace(document.clone());

        tracing::debug!(generation, path = document.path(), "Initiating render");

        let store = self.collaborators.store.clone();
        let renderer = self.collaborators.renderer.clone();
        let outcome_tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let result = async {
                let content = store.read_content(&document).await?;
                let sections = renderer.render(document.path(), content).await?;
                Ok::<_, PreviewError>(sections)
            }
            .await;

            let _ = outcome_tx.send(RenderOutcome {
                generation,
                document,
                result,
            });
        });
    }

    fn on_render_finished(&mut self, outcome: RenderOutcome) {
        let RenderOutcome {
            generation,
            document,
            result,
        } = outcome;

        if generation != self.generation || self.current_document.as_ref() != Some(&document) {
            tracing::debug!(
                generation,
                current_generation = self.generation,
                path = document.path(),
                "Discarding stale render"
            );
            return;
        }

        match result {
            Ok(sections) => {
                tracing::debug!(generation, sections = sections.len(), "Applying render");
                self.apply_render(sections);
            }
            Err(err) => {
                tracing::error!(?err, generation, path = document.path(), "Failed to render preview");
                self.collaborators.view.report_failure(&err);
            }
        }
    }

    fn apply_render(&mut self, sections: Vec<Section>) {
        self.sections = sections;

        let view = &self.collaborators.view;
        view.refresh(&self.view_context());

        if self.auto_scroll {
            let editor = &self.collaborators.editor;
            let percent =
                scroll::to_preview_percent(editor.scroll_offset(), editor.content_height());
            view.scroll_to(scroll::apply_to_preview(percent, view.content_height()));
        }
    }

    fn toggle_auto_scroll(&mut self) {
        self.auto_scroll = !self.auto_scroll;
        self.collaborators.view.update_auto_scroll(self.auto_scroll);
    }

    fn on_server_state_changed(&mut self, running: bool) {
        if self.server_state.apply(running) {
            self.collaborators
                .view
                .update_server_controls(&ServerControls::new(self.server_state.state()));
        }
    }

    fn request_server_start(&self) {
        let server = &self.collaborators.server;
        if server.is_running() {
            match &self.current_document {
                Some(document) => server.open(document),
                None => tracing::debug!("Preview server is running but no document is open"),
            }
        } else {
            server.start();
        }
    }

    fn request_server_stop(&self) {
        self.collaborators.server.stop();
    }

    fn view_context(&self) -> ViewContext {
        ViewContext {
            auto_scroll: self.auto_scroll,
            sections: self.sections.clone(),
            server: ServerControls::new(self.server_state.state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://example.com"));
        assert!(is_web_url("HTTP://EXAMPLE.COM/x"));
        assert!(!is_web_url("ftp://example.com"));
        assert!(!is_web_url("#anchor"));
        assert!(!is_web_url("guide/next.html"));
        assert!(!is_web_url("http:/broken"));
        assert!(!is_web_url(""));
    }
}
