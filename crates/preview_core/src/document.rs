//! Documents being previewed and the collaborators that own their content.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lowercase extensions of the documents the preview understands.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// Identifies the article being edited.
///
/// The path is relative to the project root and always uses `/` as the
/// separator. The reference is replaced wholesale when the user switches
/// documents; its content is owned by the editor and read on demand through a
/// [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let path = path.trim_start_matches("./").to_string();
        Self { path }
    }

    /// Builds a reference for `file` relative to `root`.
    ///
    /// Returns `None` if `file` does not live under `root`.
    pub fn from_root(root: &Path, file: &Path) -> Option<Self> {
        let relative = file.strip_prefix(root).ok()?;
        let components = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(components.join("/")))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory containing the document, `/` when the path has no directory
    /// component.
    ///
    /// # Examples
    ///
    /// ```
    /// use preview_core::DocumentRef;
    ///
    /// assert_eq!(DocumentRef::new("index.md").dir(), "/");
    /// assert_eq!(DocumentRef::new("guide/intro.md").dir(), "guide");
    /// ```
    pub fn dir(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir,
            _ => "/",
        }
    }

    /// Absolute location of the document under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.path.split('/').fold(root.to_path_buf(), |acc, c| acc.join(c))
    }
}

/// Returns `true` if the file extension is one of the markdown extensions
/// (case-insensitive).
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            MARKDOWN_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Source of scroll information for the document being edited.
pub trait Editor: Send + Sync {
    /// Current vertical scroll offset of the editor pane.
    fn scroll_offset(&self) -> f64;

    /// Total height of the editor's content.
    fn content_height(&self) -> f64;
}

/// Provides the current content snapshot of a document.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read_content(&self, document: &DocumentRef) -> std::io::Result<String>;
}

/// [`DocumentStore`] reading documents from the filesystem under a root.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read_content(&self, document: &DocumentRef) -> std::io::Result<String> {
        tokio::fs::read_to_string(document.resolve(&self.root)).await
    }
}
