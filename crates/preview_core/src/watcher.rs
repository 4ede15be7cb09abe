//! Watches a document on disk and forwards its modifications as `edited`
//! signals.
//!
//! Uses the platform's native notification backend when available, falling
//! back to polling otherwise.

use crate::controller::PreviewHandle;
use crate::document::DocumentRef;
use notify::{Event as NotifyEvent, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the document watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Polling interval of the fallback polling backend.
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchBackend {
    Native,
    Polling,
}

/// Keeps the document watched until dropped.
pub struct DocumentWatcher {
    _watcher: Box<dyn Watcher + Send>,
    file_path: PathBuf,
    backend: WatchBackend,
}

impl std::fmt::Debug for DocumentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentWatcher")
            .field("file_path", &self.file_path)
            .field("backend", &self.backend)
            .finish()
    }
}

fn event_handler(
    file_name: OsString,
    document: DocumentRef,
    handle: PreviewHandle,
) -> impl FnMut(notify::Result<NotifyEvent>) + Send + 'static {
    move |res| match res {
        Ok(event) => {
            // The parent directory is watched, only our file matters.
            let is_target_file = event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()));

            if is_target_file && (event.kind.is_modify() || event.kind.is_create()) {
                tracing::trace!(kind = ?event.kind, path = document.path(), "Document changed on disk");
                handle.edited(document.clone());
            }
        }
        Err(err) => {
            tracing::error!(?err, "File watcher error");
        }
    }
}

impl DocumentWatcher {
    /// Watches `document` under `root`, trying the native backend first.
    pub fn new(
        root: &Path,
        document: DocumentRef,
        handle: PreviewHandle,
        config: WatcherConfig,
    ) -> notify::Result<Self> {
        let file_path = document.resolve(root);

        match Self::with_backend(&file_path, &document, &handle, &config, WatchBackend::Native) {
            Ok(watcher) => {
                tracing::info!(path = ?file_path, "Started native file watcher");
                Ok(watcher)
            }
            Err(err) => {
                tracing::warn!(
                    ?err,
                    path = ?file_path,
                    "Native file watcher failed, falling back to polling"
                );
                Self::polling(root, document, handle, config)
            }
        }
    }

    /// Watches `document` under `root` by polling.
    pub fn polling(
        root: &Path,
        document: DocumentRef,
        handle: PreviewHandle,
        config: WatcherConfig,
    ) -> notify::Result<Self> {
        let file_path = document.resolve(root);
        let watcher =
            Self::with_backend(&file_path, &document, &handle, &config, WatchBackend::Polling)?;
        tracing::info!(
            path = ?file_path,
            poll_interval = ?config.poll_interval,
            "Started polling file watcher"
        );
        Ok(watcher)
    }

    fn with_backend(
        file_path: &Path,
        document: &DocumentRef,
        handle: &PreviewHandle,
        config: &WatcherConfig,
        backend: WatchBackend,
    ) -> notify::Result<Self> {
        let (Some(parent), Some(file_name)) = (file_path.parent(), file_path.file_name()) else {
            return Err(notify::Error::generic("Invalid document path"));
        };

        let handler = event_handler(file_name.to_os_string(), document.clone(), handle.clone());

        let mut watcher: Box<dyn Watcher + Send> = match backend {
            WatchBackend::Native => Box::new(RecommendedWatcher::new(
                handler,
                notify::Config::default(),
            )?),
            WatchBackend::Polling => Box::new(PollWatcher::new(
                handler,
                notify::Config::default()
                    .with_poll_interval(config.poll_interval)
                    .with_compare_contents(true),
            )?),
        };
        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            file_path: file_path.to_path_buf(),
            backend,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn backend(&self) -> WatchBackend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_config_default() {
        let config = WatcherConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
    }
}
