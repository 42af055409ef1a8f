//! Embedding provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// What an embedding will be used for.
///
/// Retrieval models embed stored passages and the questions asked against
/// them differently, so callers say which side they are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
    SemanticSimilarity,
}

impl TaskType {
    /// Wire name used by embedding APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            TaskType::RetrievalQuery => "RETRIEVAL_QUERY",
            TaskType::SemanticSimilarity => "SEMANTIC_SIMILARITY",
        }
    }
}

/// Trait for embedding providers (e.g., Gemini, OpenAI, etc.)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text
    async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>>;

    /// Number of dimensions produced by the model
    fn dimensions(&self) -> usize;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
