//! Document source trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// MIME type every source filters on
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A PDF file known to a document source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: String,
    pub name: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    PDF_MIME_TYPE.to_string()
}

impl SourceFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: default_mime_type(),
        }
    }
}

/// Trait for places PDFs are read from (Drive folders, local directories)
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List the PDFs found at `location` (a folder ID or a directory path)
    async fn list_pdfs(&self, location: &str) -> Result<Vec<SourceFile>>;

    /// Download the raw bytes of a file
    async fn download(&self, file: &SourceFile) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
