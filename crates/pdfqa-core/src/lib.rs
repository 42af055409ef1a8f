//! Core traits and types for pdfqa
//!
//! This crate defines the capability-facing interfaces shared by the rest of the
//! workspace: embedding and chat providers, vector stores, document sources and
//! the RAG engine. Concrete clients live in their own crates so every pipeline
//! can be exercised against in-memory or mocked implementations.

pub mod document_source;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod vector_store;

pub use document_source::{DocumentSource, SourceFile, PDF_MIME_TYPE};
pub use embedding::{EmbeddingProvider, TaskType};
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use rag::{RAGEngine, RAGQuery, RAGResult};
pub use vector_store::{
    IndexSpec, ScoredMatch, SearchConfig, SearchResult, VectorRecord, VectorStore,
};
