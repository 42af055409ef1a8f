//! Pinecone integration for pdfqa
//!
//! This crate provides the Pinecone implementation of the `VectorStore` trait,
//! talking to the control plane for index management and to the index host for
//! upserts and queries.

mod client;
mod config;


pub use client::PineconeClient;
pub use config::PineconeConfig;

// Re-export core types for convenience
pub use pdfqa_core::{
    Error, IndexSpec, Result, ScoredMatch, SearchConfig, SearchResult, VectorRecord, VectorStore,
};
