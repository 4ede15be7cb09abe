//! Rate limiting of document change signals.

use crate::document::DocumentRef;
use std::pin::Pin;
use tokio::time::{Duration, Instant, Sleep};

/// Quiet window applied to `edited` signals unless configured otherwise.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

// If the debounce timer isn't active, it will be set to expire "never",
// which is actually just 1 year in the future.
const NEVER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A document change reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    /// The document was opened: a visible context switch.
    Opened(DocumentRef),
    /// The document content was written.
    Edited(DocumentRef),
}

/// Turns change signals into render triggers.
///
/// `Opened` triggers right away. `Edited` arms the quiet window; every further
/// `Edited` resets it, and only the last document of the burst is released
/// once the window elapses. Driven from a `tokio::select!` loop:
///
/// ```ignore
/// tokio::select! {
///     Some(signal) = rx.recv() => {
///         if let Some(document) = debouncer.push(signal) {
///             render(document);
///         }
///     }
///     Some(document) = debouncer.expired(), if debouncer.is_pending() => render(document),
/// }
/// ```
#[derive(Debug)]
pub struct ChangeDebouncer {
    delay: Duration,
    pending: Option<DocumentRef>,
    timer: Pin<Box<Sleep>>,
}

impl ChangeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            timer: Box::pin(tokio::time::sleep(NEVER)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feeds one signal, returns the document to render immediately if any.
    pub fn push(&mut self, signal: ChangeSignal) -> Option<DocumentRef> {
        match signal {
            ChangeSignal::Opened(document) => {
                // The immediate render reads the latest content anyway.
                if self.pending.take().is_some() {
                    self.park();
                }
                Some(document)
            }
            ChangeSignal::Edited(document) => {
                self.pending.replace(document);
                self.timer.as_mut().reset(Instant::now() + self.delay);
                None
            }
        }
    }

    /// Resolves once the quiet window elapses, yielding the last edited
    /// document of the burst.
    ///
    /// Cancel safe, the timer lives in `self`.
    pub async fn expired(&mut self) -> Option<DocumentRef> {
        self.timer.as_mut().await;
        self.park();
        self.pending.take()
    }

    fn park(&mut self) {
        self.timer.as_mut().reset(Instant::now() + NEVER);
    }
}

impl Default for ChangeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str) -> DocumentRef {
        DocumentRef::new(path)
    }

    #[tokio::test(start_paused = true)]
    async fn test_opened_fires_immediately() {
        let mut debouncer = ChangeDebouncer::default();
        assert_eq!(
            debouncer.push(ChangeSignal::Opened(doc("index.md"))),
            Some(doc("index.md"))
        );
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_edit() {
        let mut debouncer = ChangeDebouncer::default();
        let start = Instant::now();

        assert_eq!(debouncer.push(ChangeSignal::Edited(doc("a.md"))), None);
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(debouncer.push(ChangeSignal::Edited(doc("b.md"))), None);
        assert!(debouncer.is_pending());

        assert_eq!(debouncer.expired().await, Some(doc("b.md")));
        // The window restarted at the second edit.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed < Duration::from_millis(260));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_opened_cancels_pending_edit() {
        let mut debouncer = ChangeDebouncer::default();
        debouncer.push(ChangeSignal::Edited(doc("a.md")));
        assert_eq!(
            debouncer.push(ChangeSignal::Opened(doc("b.md"))),
            Some(doc("b.md"))
        );
        assert!(!debouncer.is_pending());
    }
}
