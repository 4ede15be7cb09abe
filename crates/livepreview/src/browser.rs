//! Collaborators backed by the system web browser.

use preview_core::{DocumentRef, PreviewServer, Shell};
use tokio::sync::watch;

/// Serves the preview page by opening it in the browser.
///
/// The running flag is owned here and published on a watch channel, the
/// controller only ever observes it.
#[derive(Debug)]
pub struct BrowserServer {
    page_url: String,
    open_browser: bool,
    state_tx: watch::Sender<bool>,
}

impl BrowserServer {
    pub fn new(page_url: String, open_browser: bool) -> Self {
        let (state_tx, _) = watch::channel(false);
        Self {
            page_url,
            open_browser,
            state_tx,
        }
    }

    fn open_page(&self) {
        if !self.open_browser {
            println!("preview: {}", self.page_url);
            return;
        }
        if let Err(err) = webbrowser::open(&self.page_url) {
            tracing::error!(?err, url = %self.page_url, "Failed to open the preview in browser");
        }
    }
}

impl PreviewServer for BrowserServer {
    fn is_running(&self) -> bool {
        *self.state_tx.borrow()
    }

    fn open(&self, document: &DocumentRef) {
        tracing::debug!(path = document.path(), "Opening current page");
        self.open_page();
    }

    fn start(&self) {
        tracing::info!(url = %self.page_url, "Starting preview server");
        self.state_tx.send_replace(true);
        self.open_page();
    }

    fn stop(&self) {
        tracing::info!("Stopping preview server");
        self.state_tx.send_replace(false);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state_tx.subscribe()
    }
}

/// Hands external links to the browser.
#[derive(Debug, Default)]
pub struct BrowserShell;

impl Shell for BrowserShell {
    fn open_external(&self, url: &str) {
        tracing::debug!(url, "Opening link externally");
        if let Err(err) = webbrowser::open(url) {
            tracing::error!(?err, url, "Failed to open link in browser");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_state_is_published() {
        let server = BrowserServer::new("file:///tmp/preview.html".into(), false);
        let mut rx = server.subscribe();
        assert!(!server.is_running());

        server.start();
        assert!(server.is_running());
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        server.stop();
        assert!(!server.is_running());
        assert!(!*rx.borrow_and_update());
    }
}
