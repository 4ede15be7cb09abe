//! The surface the preview is drawn on.

use crate::error::PreviewError;
use crate::render::Section;
use crate::server::ServerState;
use serde::Serialize;

/// State of the start/stop server buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerControls {
    pub state: ServerState,
    /// Label (and tooltip) of the start button.
    pub start_label: &'static str,
    /// The start button is highlighted while the server runs.
    pub start_highlighted: bool,
    pub stop_visible: bool,
}

impl ServerControls {
    pub fn new(state: ServerState) -> Self {
        let running = state.is_running();
        Self {
            state,
            start_label: if running {
                "Open Current Page"
            } else {
                "Start Preview Server"
            },
            start_highlighted: running,
            stop_visible: running,
        }
    }
}

/// Render-time context handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewContext {
    pub auto_scroll: bool,
    pub sections: Vec<Section>,
    pub server: ServerControls,
}

/// Presentation layer of the preview pane.
pub trait View: Send + Sync {
    /// Redraws the pane from `context`.
    fn refresh(&self, context: &ViewContext);

    /// Height of the rendered content, used to convert scroll percentages.
    fn content_height(&self) -> f64;

    fn scroll_to(&self, offset: f64);

    fn update_server_controls(&self, controls: &ServerControls);

    /// Reflects the auto-scroll toggle.
    fn update_auto_scroll(&self, enabled: bool);

    /// Notifies the user that the preview could not be updated.
    fn report_failure(&self, _error: &PreviewError) {}
}
