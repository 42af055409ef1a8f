//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A vector together with the metadata stored next to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// A record returned by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ScoredMatch {
    /// String metadata field, if present
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Integer metadata field, if present.
    ///
    /// Some stores hand numbers back as floats, so both are accepted.
    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        let value = self.metadata.get(key)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|f| f as u64))
    }
}

/// Search result from vector store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub matches: Vec<ScoredMatch>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
    pub filter: Option<serde_json::Value>,
    pub namespace: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: None,
            filter: None,
            namespace: None,
        }
    }
}

/// Description of the index the vectors live in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl Default for IndexSpec {
    fn default() -> Self {
        Self {
            name: "pdf-qa-bot".to_string(),
            dimension: 768,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-west-2".to_string(),
        }
    }
}

/// Trait for vector stores (e.g., Pinecone, in-memory)
///
/// Ranking is left entirely to the store's similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Initialize the vector store connection, creating the index if needed
    async fn connect(&mut self) -> Result<()>;

    /// Make sure the index described by `spec` exists and is ready
    async fn ensure_index(&mut self, spec: &IndexSpec) -> Result<()>;

    /// Insert or overwrite records, returning how many were written
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize>;

    /// Similarity search with a query vector
    async fn query(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get a record by ID
    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>>;

    /// Delete records by ID
    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Delete every record
    async fn delete_all(&self) -> Result<()>;

    /// Get the total number of records
    async fn count(&self) -> Result<usize>;

    /// Check if the vector store is connected
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scored_match_reads_float_chunk_index() {
        let m = ScoredMatch {
            id: "abc_3".to_string(),
            score: 0.9,
            metadata: json!({"source": "a.pdf", "chunk_index": 3.0}),
        };
        assert_eq!(m.metadata_u64("chunk_index"), Some(3));
        assert_eq!(m.metadata_str("source"), Some("a.pdf"));
        assert_eq!(m.metadata_str("missing"), None);
    }

    #[test]
    fn default_index_spec() {
        insta::assert_yaml_snapshot!(IndexSpec::default(), @r###"
        ---
        name: pdf-qa-bot
        dimension: 768
        metric: cosine
        cloud: aws
        region: us-west-2
        "###);
    }
}
