//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, ScoredMatch};

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
    pub filter: Option<serde_json::Value>,
}

impl RAGQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

impl Default for RAGQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 5,
            score_threshold: None,
            filter: None,
        }
    }
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    pub matches: Vec<ScoredMatch>,
    pub context: String,
    pub metadata: Option<serde_json::Value>,
}

/// Trait for RAG engines
///
/// Retrieval embeds the question, asks the vector store for the closest
/// passages and turns them into prompt context.
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Retrieve relevant passages for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Build context from retrieved passages
    fn build_context(&self, matches: &[ScoredMatch]) -> String;

    /// Combine an already retrieved result with a prompt
    fn compose_prompt(&self, prompt: &str, result: &RAGResult) -> String;

    /// Enhance a prompt with RAG context
    async fn enhance_prompt(&self, prompt: &str, query: &RAGQuery) -> Result<String>;

    /// Get statistics about the RAG engine
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Check if the RAG engine is ready
    fn is_ready(&self) -> bool;
}
