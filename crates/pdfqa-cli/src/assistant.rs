//! Answers questions about indexed PDFs using retrieval plus a chat model

use serde::{Deserialize, Serialize};
use tracing::debug;

use pdfqa_core::{
    Error, GenerationConfig, LLMProvider, RAGEngine, RAGQuery, Result, ScoredMatch,
};

/// A passage an answer was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub chunk_index: Option<u64>,
    pub score: f32,
}

impl SourceRef {
    pub(crate) fn from_match(m: &ScoredMatch) -> Self {
        Self {
            source: m.metadata_str("source").unwrap_or(m.id.as_str()).to_string(),
            chunk_index: m.metadata_u64("chunk_index"),
            score: m.score,
        }
    }
}

/// The model's answer together with the passages it was shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

impl Answer {
    /// Distinct source file names, in retrieval order
    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for s in &self.sources {
            if !names.contains(&s.source.as_str()) {
                names.push(&s.source);
            }
        }
        names
    }
}

/// Question answerer that retrieves passages and asks the LLM to answer from them
pub struct QuestionAnswerer<L: LLMProvider, R: RAGEngine> {
    llm: L,
    rag: R,
    top_k: usize,
    score_threshold: Option<f32>,
    max_tokens: u32,
}

impl<L: LLMProvider, R: RAGEngine> QuestionAnswerer<L, R> {
    /// Create a new question answerer
    pub fn new(llm: L, rag: R) -> Self {
        Self {
            llm,
            rag,
            top_k: RAGQuery::default().top_k,
            score_threshold: None,
            max_tokens: GenerationConfig::default().max_tokens,
        }
    }

    /// Number of passages retrieved per question
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_score_threshold(mut self, threshold: Option<f32>) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn rag(&self) -> &R {
        &self.rag
    }

    /// Answer a question from the indexed PDFs
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("Question is empty".to_string()));
        }

        let query = RAGQuery {
            query: question.to_string(),
            top_k: self.top_k,
            score_threshold: self.score_threshold,
            filter: None,
        };

        let retrieved = self.rag.retrieve(&query).await?;
        let prompt = self.rag.compose_prompt(question, &retrieved);
        debug!(passages = retrieved.matches.len(), prompt_len = prompt.len(), "Built prompt");

        let config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        let result = self.llm.generate_with_config(&prompt, &config).await?;

        Ok(Answer {
            text: result.text,
            sources: retrieved.matches.iter().map(SourceRef::from_match).collect(),
        })
    }
}
