//! PDF indexing pipeline: download, extract, split, embed, upsert

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use pdfqa_core::{
    DocumentSource, EmbeddingProvider, Result, SourceFile, TaskType, VectorRecord, VectorStore,
};

use crate::pdf::{PdfTextExtractor, TextExtractor};
use crate::splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterTextSplitter};

/// Configuration for document indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks sent per upsert request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            batch_size: 1,
        }
    }
}

/// Result of an indexing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub files_processed: usize,
    pub chunks_indexed: usize,
    pub files_failed: usize,
    pub errors: Vec<String>,
}

impl IndexingResult {
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }
}

/// Vector ID of one chunk of a file
pub fn chunk_id(file_id: &str, chunk_index: usize) -> String {
    format!("{}_{}", file_id, chunk_index)
}

/// Indexes PDFs from any `DocumentSource` into any `VectorStore`
pub struct PdfIndexer<E: EmbeddingProvider, V: VectorStore> {
    embedder: Arc<E>,
    vector_store: Arc<V>,
    extractor: Arc<dyn TextExtractor>,
    splitter: RecursiveCharacterTextSplitter,
    config: IndexingConfig,
}

impl<E: EmbeddingProvider, V: VectorStore> PdfIndexer<E, V> {
    /// Create a new indexer with the default configuration
    pub fn new(embedder: Arc<E>, vector_store: Arc<V>) -> Self {
        Self {
            embedder,
            vector_store,
            extractor: Arc::new(PdfTextExtractor::new()),
            splitter: RecursiveCharacterTextSplitter::default(),
            config: IndexingConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(
        embedder: Arc<E>,
        vector_store: Arc<V>,
        config: IndexingConfig,
    ) -> Result<Self> {
        let splitter =
            RecursiveCharacterTextSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            splitter,
            config,
            ..Self::new(embedder, vector_store)
        })
    }

    /// Swap the text extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Fetch one PDF, extract its text and store every chunk.
    ///
    /// Returns the number of chunks written.
    pub async fn process_and_store_pdf(
        &self,
        source: &dyn DocumentSource,
        file: &SourceFile,
    ) -> Result<usize> {
        let bytes = source.download(file).await?;
        debug!(file = %file.name, bytes = bytes.len(), source = source.name(), "Fetched PDF");

        let text = self.extractor.extract_text(bytes).await?;
        self.index_text(file, &text).await
    }

    /// Split already extracted text and store every chunk
    pub async fn index_text(&self, file: &SourceFile, text: &str) -> Result<usize> {
        let chunks = self.splitter.split_text(text);
        if chunks.is_empty() {
            warn!(file = %file.name, "No text extracted; nothing to index");
            return Ok(0);
        }

        let batch_size = self.config.batch_size.max(1);
        let mut batch = Vec::with_capacity(batch_size);
        let mut written = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            let values = self.embedder.embed(chunk, TaskType::RetrievalDocument).await?;

            batch.push(VectorRecord {
                id: chunk_id(&file.id, i),
                values,
                metadata: json!({
                    "source": file.name,
                    "file_id": file.id,
                    "chunk_index": i,
                    "text": chunk,
                }),
            });

            if batch.len() >= batch_size {
                written += self.vector_store.upsert(std::mem::take(&mut batch)).await?;
            }
        }

        if !batch.is_empty() {
            written += self.vector_store.upsert(batch).await?;
        }

        info!(file = %file.name, chunks = chunks.len(), "Indexed PDF");
        Ok(written)
    }

    /// Index every PDF found at `location`, one file after another.
    ///
    /// A file that fails is recorded in the result and the run carries on.
    pub async fn index_location(
        &self,
        source: &dyn DocumentSource,
        location: &str,
    ) -> Result<IndexingResult> {
        let files = source.list_pdfs(location).await?;
        info!(location, count = files.len(), source = source.name(), "Found PDFs");

        let mut result = IndexingResult::default();

        for file in &files {
            match self.process_and_store_pdf(source, file).await {
                Ok(chunks) => {
                    result.files_processed += 1;
                    result.chunks_indexed += chunks;
                }
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Failed to index PDF");
                    result.files_failed += 1;
                    result.errors.push(format!("{}: {}", file.name, e));
                }
            }
        }

        Ok(result)
    }

    /// Get indexing statistics
    pub async fn stats(&self) -> Result<serde_json::Value> {
        let count = self.vector_store.count().await?;
        Ok(json!({
            "total_vectors": count,
            "chunk_size": self.config.chunk_size,
            "chunk_overlap": self.config.chunk_overlap,
            "batch_size": self.config.batch_size,
            "embedding_model": self.embedder.model_id(),
        }))
    }
}
