//! Tests for the question answerer and chat commands

#[cfg(test)]
mod answerer_tests {
    use crate::{Answer, ChatCommand, QuestionAnswerer, SourceRef};
    use async_trait::async_trait;
    use pdfqa_core::{
        Error, GenerationConfig, GenerationResult, LLMProvider, RAGEngine, RAGQuery, RAGResult,
        Result, ScoredMatch,
    };
    use serde_json::json;
    use std::sync::Mutex;

    /// LLM that records what it was asked and replies with a fixed answer
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
        configs: Mutex<Vec<GenerationConfig>>,
    }

    impl RecordingLlm {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                configs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_with_config(prompt, &GenerationConfig::default())
                .await
        }

        async fn generate_with_config(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.configs.lock().unwrap().push(config.clone());
            Ok(GenerationResult {
                text: "Refunds are accepted within 30 days.".to_string(),
                model_id: config.model_id.clone(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "test-chat"
        }
    }

    /// RAG engine serving canned matches
    struct CannedRag {
        matches: Vec<ScoredMatch>,
        queries: Mutex<Vec<RAGQuery>>,
    }

    impl CannedRag {
        fn new(matches: Vec<ScoredMatch>) -> Self {
            Self {
                matches,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RAGEngine for CannedRag {
        async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
            self.queries.lock().unwrap().push(query.clone());
            let matches: Vec<ScoredMatch> =
                self.matches.iter().take(query.top_k).cloned().collect();
            Ok(RAGResult {
                context: self.build_context(&matches),
                matches,
                metadata: None,
            })
        }

        fn build_context(&self, matches: &[ScoredMatch]) -> String {
            matches
                .iter()
                .filter_map(|m| m.metadata_str("text"))
                .collect::<Vec<_>>()
                .join("\n")
        }

        fn compose_prompt(&self, prompt: &str, result: &RAGResult) -> String {
            format!("CONTEXT:\n{}\nQ: {}", result.context, prompt)
        }

        async fn enhance_prompt(&self, prompt: &str, query: &RAGQuery) -> Result<String> {
            let result = self.retrieve(query).await?;
            Ok(self.compose_prompt(prompt, &result))
        }

        async fn stats(&self) -> Result<serde_json::Value> {
            Ok(json!({}))
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    fn passage(id: &str, source: &str, index: u64, score: f32, text: &str) -> ScoredMatch {
        ScoredMatch {
            id: id.to_string(),
            score,
            metadata: json!({"source": source, "chunk_index": index, "text": text}),
        }
    }

    fn policy_matches() -> Vec<ScoredMatch> {
        vec![
            passage("p_2", "policy.pdf", 2, 0.91, "Refunds within 30 days."),
            passage("f_0", "faq.pdf", 0, 0.74, "Keep your receipt."),
            passage("p_5", "policy.pdf", 5, 0.60, "Store credit otherwise."),
        ]
    }

    #[tokio::test]
    async fn answer_uses_retrieved_context() {
        let answerer = QuestionAnswerer::new(RecordingLlm::new(), CannedRag::new(policy_matches()))
            .with_top_k(2);

        let answer = answerer.answer("  Can I get a refund? ").await.unwrap();

        assert_eq!(answer.text, "Refunds are accepted within 30 days.");
        assert_eq!(
            answer.sources,
            vec![
                SourceRef {
                    source: "policy.pdf".to_string(),
                    chunk_index: Some(2),
                    score: 0.91,
                },
                SourceRef {
                    source: "faq.pdf".to_string(),
                    chunk_index: Some(0),
                    score: 0.74,
                },
            ]
        );

        let queries = answerer.rag().queries.lock().unwrap();
        assert_eq!(queries[0].query, "Can I get a refund?");
        assert_eq!(queries[0].top_k, 2);
    }

    #[tokio::test]
    async fn prompt_and_generation_config_reach_the_llm() {
        let llm = RecordingLlm::new();
        let answerer = QuestionAnswerer::new(llm, CannedRag::new(policy_matches()))
            .with_top_k(1)
            .with_max_tokens(256);

        answerer.answer("Refund?").await.unwrap();

        let prompts = answerer.llm().prompts.lock().unwrap();
        assert_eq!(prompts[0], "CONTEXT:\nRefunds within 30 days.\nQ: Refund?");

        let configs = answerer.llm().configs.lock().unwrap();
        assert_eq!(configs[0].model_id, "test-chat");
        assert_eq!(configs[0].max_tokens, 256);
    }

    #[tokio::test]
    async fn empty_question_is_rejected_before_retrieval() {
        let answerer = QuestionAnswerer::new(RecordingLlm::new(), CannedRag::new(policy_matches()));

        let err = answerer.answer("   ").await.unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(answerer.rag().queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_k_is_at_least_one() {
        let answerer =
            QuestionAnswerer::new(RecordingLlm::new(), CannedRag::new(Vec::new())).with_top_k(0);
        assert_eq!(answerer.top_k(), 1);
    }

    #[test]
    fn source_names_are_distinct_and_ordered() {
        let answer = Answer {
            text: String::new(),
            sources: vec![
                SourceRef {
                    source: "policy.pdf".to_string(),
                    chunk_index: Some(2),
                    score: 0.9,
                },
                SourceRef {
                    source: "faq.pdf".to_string(),
                    chunk_index: None,
                    score: 0.8,
                },
                SourceRef {
                    source: "policy.pdf".to_string(),
                    chunk_index: Some(5),
                    score: 0.7,
                },
            ],
        };

        assert_eq!(answer.source_names(), vec!["policy.pdf", "faq.pdf"]);
    }

    #[test]
    fn missing_source_falls_back_to_vector_id() {
        let bare = ScoredMatch {
            id: "abc_3".to_string(),
            score: 0.5,
            metadata: json!({}),
        };
        let source = SourceRef::from_match(&bare);
        assert_eq!(source.source, "abc_3");
        assert_eq!(source.chunk_index, None);
    }

    #[test]
    fn test_chat_command_parsing() {
        assert_eq!(ChatCommand::parse(""), ChatCommand::Empty);
        assert_eq!(ChatCommand::parse("  HELP "), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("sources"), ChatCommand::Sources);
        assert_eq!(ChatCommand::parse("clear"), ChatCommand::Clear);
        assert_eq!(ChatCommand::parse("quit"), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("Exit"), ChatCommand::Exit);
        assert_eq!(
            ChatCommand::parse(" What does Help cover? "),
            ChatCommand::Ask("What does Help cover?".to_string())
        );
        insta::assert_debug_snapshot!(ChatCommand::parse("sources"), @"Sources");
    }
}
