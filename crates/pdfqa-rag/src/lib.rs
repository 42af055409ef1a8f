//! PDF ingestion and retrieval for pdfqa
//!
//! This crate provides the text extractor, the recursive character splitter,
//! the indexing pipeline, the RAG engine and an in-memory vector store.

mod engine;
mod indexer;
mod pdf;
mod splitter;
mod vector_store;


pub use engine::PdfRagEngine;
pub use indexer::{chunk_id, IndexingConfig, IndexingResult, PdfIndexer};
pub use pdf::{PdfTextExtractor, TextExtractor};
pub use splitter::{RecursiveCharacterTextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use pdfqa_core::{
    DocumentSource, EmbeddingProvider, Error, IndexSpec, RAGEngine, RAGQuery, RAGResult, Result,
    ScoredMatch, SearchConfig, SearchResult, SourceFile, TaskType, VectorRecord, VectorStore,
};
