pub mod render;
pub mod watch;

use anyhow::{anyhow, Result};
use preview_core::DocumentRef;
use std::path::{Path, PathBuf};

/// Resolves the document file and the project root it is previewed against.
///
/// The root defaults to the directory containing the document.
pub(crate) fn locate_document(
    file: &Path,
    root: Option<&Path>,
) -> Result<(PathBuf, DocumentRef)> {
    let file = file
        .canonicalize()
        .map_err(|err| anyhow!("failed to locate {}: {err}", file.display()))?;

    let root = match root {
        Some(root) => root
            .canonicalize()
            .map_err(|err| anyhow!("failed to locate {}: {err}", root.display()))?,
        None => file
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("{} has no parent directory", file.display()))?,
    };

    let document = DocumentRef::from_root(&root, &file).ok_or_else(|| {
        anyhow!(
            "{} is not inside the project root {}",
            file.display(),
            root.display()
        )
    })?;

    Ok((root, document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_document() {
        let dir = tempfile::tempdir().unwrap();
        let guide = dir.path().join("guide");
        std::fs::create_dir(&guide).unwrap();
        let file = guide.join("intro.md");
        std::fs::write(&file, "# Intro").unwrap();

        let (root, document) = locate_document(&file, None).unwrap();
        assert_eq!(root, guide.canonicalize().unwrap());
        assert_eq!(document.path(), "intro.md");

        let (root, document) = locate_document(&file, Some(dir.path())).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());
        assert_eq!(document.path(), "guide/intro.md");
    }

    #[test]
    fn test_document_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.md");
        std::fs::write(&file, "").unwrap();

        assert!(locate_document(&file, Some(other.path())).is_err());
    }
}
