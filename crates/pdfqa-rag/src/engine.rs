//! RAG engine implementation

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use pdfqa_core::{
    EmbeddingProvider, Error, RAGEngine, RAGQuery, RAGResult, Result, ScoredMatch, SearchConfig,
    TaskType, VectorStore,
};

const CONTEXT_HEADER: &str = "Relevant passages from your PDFs:\n\n";
const NO_CONTEXT: &str = "No relevant passages were found in the indexed PDFs.\n";

/// Retrieval over PDFs indexed by `PdfIndexer`
pub struct PdfRagEngine<E: EmbeddingProvider, V: VectorStore> {
    embedder: Arc<E>,
    vector_store: Arc<V>,
}

impl<E: EmbeddingProvider, V: VectorStore> PdfRagEngine<E, V> {
    /// Create a new RAG engine
    pub fn new(embedder: Arc<E>, vector_store: Arc<V>) -> Self {
        Self {
            embedder,
            vector_store,
        }
    }
}

#[async_trait]
impl<E: EmbeddingProvider + 'static, V: VectorStore + 'static> RAGEngine for PdfRagEngine<E, V> {
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        if query.query.trim().is_empty() {
            return Err(Error::InvalidInput("Question is empty".to_string()));
        }
        if !self.vector_store.is_connected() {
            return Err(Error::RAGEngine("Vector store not connected".to_string()));
        }

        let vector = self
            .embedder
            .embed(&query.query, TaskType::RetrievalQuery)
            .await?;

        let search_config = SearchConfig {
            top_k: query.top_k,
            score_threshold: query.score_threshold,
            filter: query.filter.clone(),
            namespace: None,
        };

        let search_result = self.vector_store.query(&vector, &search_config).await?;
        debug!(matches = search_result.total, top_k = query.top_k, "Retrieved passages");

        let context = self.build_context(&search_result.matches);

        Ok(RAGResult {
            metadata: Some(json!({
                "query": query.query,
                "top_k": query.top_k,
                "results_count": search_result.total,
            })),
            matches: search_result.matches,
            context,
        })
    }

    fn build_context(&self, matches: &[ScoredMatch]) -> String {
        let passages: Vec<(&ScoredMatch, &str)> = matches
            .iter()
            .filter_map(|m| m.metadata_str("text").map(|text| (m, text)))
            .collect();

        if passages.is_empty() {
            return String::new();
        }

        let mut context = String::from(CONTEXT_HEADER);

        for (i, (m, text)) in passages.iter().enumerate() {
            context.push_str(&format!("{}. ", i + 1));

            if let Some(source) = m.metadata_str("source") {
                match m.metadata_u64("chunk_index") {
                    Some(index) => context.push_str(&format!("[{} #{}] ", source, index)),
                    None => context.push_str(&format!("[{}] ", source)),
                }
            }

            context.push_str(text);
            context.push_str("\n\n");
        }

        context
    }

    fn compose_prompt(&self, prompt: &str, result: &RAGResult) -> String {
        let mut enhanced = String::new();

        if result.context.is_empty() {
            enhanced.push_str(NO_CONTEXT);
        } else {
            enhanced.push_str(&result.context);
        }

        enhanced.push_str("\n---\n\n");
        enhanced.push_str(
            "Answer the question using only the passages above. \
             If they do not contain the answer, say that you don't know.\n\n",
        );
        enhanced.push_str("Question: ");
        enhanced.push_str(prompt.trim());
        enhanced.push_str("\nAnswer:");

        enhanced
    }

    async fn enhance_prompt(&self, prompt: &str, query: &RAGQuery) -> Result<String> {
        let rag_result = self.retrieve(query).await?;
        Ok(self.compose_prompt(prompt, &rag_result))
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let vector_count = self.vector_store.count().await?;

        Ok(json!({
            "ready": self.is_ready(),
            "vector_count": vector_count,
            "embedding_model": self.embedder.model_id(),
            "dimensions": self.embedder.dimensions(),
        }))
    }

    fn is_ready(&self) -> bool {
        self.vector_store.is_connected()
    }
}
