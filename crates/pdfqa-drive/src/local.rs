//! Local directory document source

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use pdfqa_core::{DocumentSource, Error, PDF_MIME_TYPE, Result, SourceFile};

/// Reads PDFs from a directory on disk.
///
/// Locations passed to `list_pdfs` are sub-directories of the root (`""` is
/// the root itself). Listed file names are relative to the root, and file IDs
/// are derived from them so re-indexing a file overwrites its old vectors.
#[derive(Debug, Clone)]
pub struct LocalDirectorySource {
    root: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stable vector-ID prefix for a root-relative file name.
    ///
    /// Form-urlencoded, so the ID is ASCII and distinct names never share one.
    pub fn file_id(relative: &str) -> String {
        url::form_urlencoded::byte_serialize(relative.as_bytes()).collect()
    }

    fn is_pdf(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    /// Reject names that would escape the root directory
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::InvalidInput(format!(
                "{} is outside {}",
                relative,
                self.root.display()
            )));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl DocumentSource for LocalDirectorySource {
    async fn list_pdfs(&self, location: &str) -> Result<Vec<SourceFile>> {
        let dir = self.resolve(location)?;
        if !dir.is_dir() {
            return Err(Error::DocumentSource(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !(entry.file_type().await?.is_file() && Self::is_pdf(&path)) {
                continue;
            }
            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            names.push(relative);
        }

        names.sort();
        debug!(dir = %dir.display(), count = names.len(), "Listed local PDFs");

        Ok(names
            .into_iter()
            .map(|name| SourceFile {
                id: Self::file_id(&name),
                name,
                mime_type: PDF_MIME_TYPE.to_string(),
            })
            .collect())
    }

    async fn download(&self, file: &SourceFile) -> Result<Vec<u8>> {
        let path = self.resolve(&file.name)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            Error::DocumentSource(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_is_url_safe() {
        assert_eq!(
            LocalDirectorySource::file_id("Annual Report 2023.pdf"),
            "Annual+Report+2023.pdf"
        );
        assert_eq!(LocalDirectorySource::file_id("sub/notes.PDF"), "sub%2Fnotes.PDF");
        assert_eq!(
            LocalDirectorySource::file_id("議事録.pdf"),
            "%E8%AD%B0%E4%BA%8B%E9%8C%B2.pdf"
        );
    }

    #[tokio::test]
    async fn distinct_files_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["議事録.pdf", "報告書.pdf", "a b.pdf", "a_b.pdf", "a+b.pdf", "a-b.pdf"] {
            std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
        }

        let source = LocalDirectorySource::new(dir.path());
        let files = source.list_pdfs("").await.unwrap();
        assert_eq!(files.len(), 6);

        let ids: std::collections::HashSet<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), files.len(), "colliding ids: {files:?}");
        assert!(ids.iter().all(|id| id.is_ascii()));
    }

    #[tokio::test]
    async fn lists_only_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4 b").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"%PDF-1.4 a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not a pdf").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let source = LocalDirectorySource::new(dir.path());
        let files = source.list_pdfs("").await.unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(files[0].id, "a.PDF");

        let bytes = source.download(&files[1]).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 b");
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalDirectorySource::new(dir.path());

        let err = source
            .download(&SourceFile::new("x", "../secret.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalDirectorySource::new(dir.path());
        let err = source.list_pdfs("nope").await.unwrap_err();
        assert!(matches!(err, Error::DocumentSource(_)));
    }
}
