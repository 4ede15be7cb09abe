//! Client-side reflection of the external preview server.

use crate::document::DocumentRef;
use serde::Serialize;
use tokio::sync::watch;

/// Operations exposed by the external preview server.
///
/// All intents are fire-and-forget; failures are the server's business.
pub trait PreviewServer: Send + Sync {
    /// Whether the server currently reports itself running.
    fn is_running(&self) -> bool;

    /// Brings an already running server's view to `document`.
    fn open(&self, document: &DocumentRef);

    /// Boots the server, or refreshes it.
    fn start(&self);

    fn stop(&self);

    /// Stream of `running` notifications.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Last known state of the external server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    #[default]
    Stopped,
    Running,
}

impl ServerState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<bool> for ServerState {
    fn from(running: bool) -> Self {
        if running {
            Self::Running
        } else {
            Self::Stopped
        }
    }
}

/// Holds the most recent state notified by the external server.
///
/// Transitions are never inferred locally, only [`Self::apply`] moves the
/// state, and no history is kept.
#[derive(Debug, Default)]
pub struct ServerStateReflector {
    state: ServerState,
}

impl ServerStateReflector {
    pub fn new(initial: ServerState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Records a notification, returns `true` if the state actually changed.
    pub fn apply(&mut self, running: bool) -> bool {
        let new_state = ServerState::from(running);
        if new_state == self.state {
            return false;
        }
        tracing::debug!(from = ?self.state, to = ?new_state, "Preview server state changed");
        self.state = new_state;
        true
    }
}
