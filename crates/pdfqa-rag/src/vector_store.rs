//! In-memory vector store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use pdfqa_core::{
    Error, IndexSpec, Result, ScoredMatch, SearchConfig, SearchResult, VectorRecord, VectorStore,
};

/// Local in-memory vector store using cosine similarity.
///
/// Used for `--store memory` runs and tests; nothing survives the process.
pub struct LocalVectorStore {
    records: Arc<RwLock<HashMap<String, VectorRecord>>>,
    spec: Option<IndexSpec>,
    connected: bool,
}

impl LocalVectorStore {
    /// Create a new local vector store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            spec: None,
            connected: false,
        }
    }

    /// Simple cosine similarity calculation
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    /// Equality filter on top-level metadata keys; `{"$eq": v}` is accepted too
    fn matches_filter(metadata: &serde_json::Value, filter: &serde_json::Value) -> bool {
        let Some(conditions) = filter.as_object() else {
            return true;
        };

        conditions.iter().all(|(key, expected)| {
            let expected = expected.get("$eq").unwrap_or(expected);
            metadata.get(key) == Some(expected)
        })
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> Error {
        Error::VectorStore(format!("Lock error: {}", e))
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn ensure_index(&mut self, spec: &IndexSpec) -> Result<()> {
        self.spec = Some(spec.clone());
        self.connected = true;
        Ok(())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize> {
        if let Some(spec) = &self.spec {
            if let Some(bad) = records.iter().find(|r| r.values.len() != spec.dimension) {
                return Err(Error::VectorStore(format!(
                    "Vector {} has dimension {}, index {} expects {}",
                    bad.id,
                    bad.values.len(),
                    spec.name,
                    spec.dimension
                )));
            }
        }

        let mut docs = self.records.write().map_err(Self::lock_error)?;
        let written = records.len();
        for record in records {
            docs.insert(record.id.clone(), record);
        }

        Ok(written)
    }

    async fn query(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let docs = self.records.read().map_err(Self::lock_error)?;

        let mut matches: Vec<ScoredMatch> = docs
            .values()
            .filter(|record| {
                config
                    .filter
                    .as_ref()
                    .is_none_or(|f| Self::matches_filter(&record.metadata, f))
            })
            .map(|record| ScoredMatch {
                id: record.id.clone(),
                score: Self::cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .filter(|m| config.score_threshold.is_none_or(|t| m.score >= t))
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(config.top_k);

        let total = matches.len();

        Ok(SearchResult { matches, total })
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>> {
        let docs = self.records.read().map_err(Self::lock_error)?;
        Ok(docs.get(id).cloned())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut docs = self.records.write().map_err(Self::lock_error)?;
        for id in ids {
            docs.remove(id);
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut docs = self.records.write().map_err(Self::lock_error)?;
        docs.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.records.read().map_err(Self::lock_error)?;
        Ok(docs.len())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>, source: &str) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: json!({"source": source}),
        }
    }

    #[tokio::test]
    async fn test_local_vector_store() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();

        let written = store
            .upsert(vec![record("test1", vec![1.0, 0.0], "a.pdf")])
            .await
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.count().await.unwrap(), 1);

        // Upserting the same id overwrites
        store
            .upsert(vec![record("test1", vec![0.0, 1.0], "a.pdf")])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        let fetched = store.fetch("test1").await.unwrap().unwrap();
        assert_eq!(fetched.values, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();
        store
            .upsert(vec![
                record("near", vec![1.0, 0.1], "a.pdf"),
                record("far", vec![0.0, 1.0], "b.pdf"),
                record("middle", vec![1.0, 1.0], "a.pdf"),
            ])
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 2,
            ..Default::default()
        };
        let result = store.query(&[1.0, 0.0], &config).await.unwrap();
        let ids: Vec<&str> = result.matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "middle"]);

        let filtered = SearchConfig {
            top_k: 5,
            filter: Some(json!({"source": {"$eq": "b.pdf"}})),
            ..Default::default()
        };
        let result = store.query(&[1.0, 0.0], &filtered).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.matches[0].id, "far");

        let thresholded = SearchConfig {
            top_k: 5,
            score_threshold: Some(0.5),
            ..Default::default()
        };
        let result = store.query(&[1.0, 0.0], &thresholded).await.unwrap();
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_dimension_checked_after_ensure_index() {
        let mut store = LocalVectorStore::new();
        let spec = IndexSpec {
            dimension: 3,
            ..Default::default()
        };
        store.ensure_index(&spec).await.unwrap();
        assert!(store.is_connected());

        let err = store
            .upsert(vec![record("x", vec![1.0, 2.0], "a.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = LocalVectorStore::new();
        store
            .upsert(vec![
                record("a", vec![1.0], "a.pdf"),
                record("b", vec![1.0], "b.pdf"),
            ])
            .await
            .unwrap();

        store.delete(&["a".to_string()]).await.unwrap();
        assert!(store.fetch("a").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);

        store.delete_all().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
