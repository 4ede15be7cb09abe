use super::locate_document;
use anyhow::Result;
use clap::Parser;
use preview_core::{DocumentStore, FsDocumentStore, MarkdownRenderer, SectionRenderer};
use std::path::PathBuf;

/// Renders a document once.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Document to render.
    path: PathBuf,

    /// Project root the document path is relative to.
    ///
    /// Defaults to the directory containing the document.
    #[clap(long)]
    root: Option<PathBuf>,
}

impl Render {
    pub async fn run(self) -> Result<()> {
        let (root, document) = locate_document(&self.path, self.root.as_deref())?;

        let content = FsDocumentStore::new(root)
            .read_content(&document)
            .await?;

        let sections = MarkdownRenderer::default()
            .render(document.path(), content)
            .await?;

        tracing::debug!(path = document.path(), sections = sections.len(), "Rendered document");

        println!("{}", serde_json::to_string_pretty(&sections)?);

        Ok(())
    }
}
