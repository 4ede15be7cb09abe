//! Live preview pipeline.
//!
//! Turns the document being edited into an HTML preview that follows every
//! change, keeps the preview scroll position in sync with the editor and
//! reflects the state of an external preview server.
//!
//! # Modules
//!
//! - [`debounce`] - Immediate `opened` and rate-limited `edited` signals
//! - [`render`] - Parser adapter: content to ordered HTML sections
//! - [`controller`] - The orchestrator, discards superseded renders
//! - [`scroll`] - Editor/preview scroll percentage bridge
//! - [`server`] - Reflection of the external preview server state
//! - [`view`] - Presentation surface and its render-time context
//! - [`watcher`] - Document file watching
//! - [`image_sources`] - `file://` image source rewriting

pub mod controller;
pub mod debounce;
pub mod document;
pub mod error;
pub mod image_sources;
pub mod render;
pub mod scroll;
pub mod server;
pub mod view;
pub mod watcher;

// Re-export commonly used types at crate root
pub use controller::{
    is_web_url, Collaborators, LinkAction, PreviewController, PreviewHandle, PreviewSettings, Shell,
};
pub use debounce::{ChangeDebouncer, ChangeSignal, DEFAULT_DEBOUNCE};
pub use document::{is_markdown_path, DocumentRef, DocumentStore, Editor, FsDocumentStore};
pub use error::{LexError, PageError, ParseFailure, ParseStage, PreviewError};
pub use render::{render_sections, MarkdownRenderer, RenderOptions, Section, SectionRenderer};
pub use server::{PreviewServer, ServerState, ServerStateReflector};
pub use view::{ServerControls, View, ViewContext};
pub use watcher::{DocumentWatcher, WatchBackend, WatcherConfig};
