//! HTTP-level tests for the Gemini client

#[cfg(test)]
mod mock_server_tests {
    use crate::{
        EmbeddingProvider, Error, GeminiClient, GeminiConfig, GenerationConfig, LLMProvider,
        TaskType,
    };
    use insta::assert_yaml_snapshot;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> GeminiClient {
        let config = GeminiConfig::new("test-key").with_api_url(server.url());
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_config_snapshot() {
        let config = GeminiConfig::new("test_api_key_redacted");

        assert_yaml_snapshot!(config, @r###"
        ---
        api_key: test_api_key_redacted
        api_url: "https://generativelanguage.googleapis.com"
        embed_model: embedding-001
        chat_model: gemini-1.5-flash
        embed_dimensions: 768
        "###);
    }

    #[tokio::test]
    async fn embed_sends_task_type_and_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/embedding-001:embedContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "models/embedding-001",
                "taskType": "RETRIEVAL_QUERY",
                "content": {"parts": [{"text": "what is in chapter 2?"}]}
            })))
            .with_status(200)
            .with_body(json!({"embedding": {"values": [0.1, 0.2, 0.3]}}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let vector = client
            .embed("what is in chapter 2?", TaskType::RetrievalQuery)
            .await
            .unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn embed_maps_http_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/embedding-001:embedContent")
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .embed("text", TaskType::RetrievalDocument)
            .await
            .unwrap_err();

        match err {
            Error::Api { service, status, body } => {
                assert_eq!(service, "gemini");
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn embed_rejects_empty_text_without_calling_api() {
        let server = Server::new_async().await;
        let client = client_for(&server);
        let err = client.embed("   ", TaskType::RetrievalDocument).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn generate_joins_candidate_parts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Question?"}]}],
                "generationConfig": {"maxOutputTokens": 1024}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "The answer "}, {"text": "is 42.\n"}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"totalTokenCount": 17}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.generate("Question?").await.unwrap();

        assert_eq!(result.text, "The answer is 42.");
        assert_eq!(result.model_id, "gemini-1.5-flash");
        assert_eq!(result.tokens_used, Some(17));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn generate_without_candidates_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/custom-model:generateContent")
            .with_status(200)
            .with_body(json!({"candidates": []}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let config = GenerationConfig {
            model_id: "custom-model".to_string(),
            ..Default::default()
        };
        let err = client.generate_with_config("hi", &config).await.unwrap_err();
        assert!(matches!(err, Error::LLMProvider(_)));
    }

    #[test]
    fn test_model_ids() {
        let client = GeminiClient::new(GeminiConfig::new("k"))
            .unwrap()
            .with_chat_model("gemini-1.5-pro");
        assert_eq!(LLMProvider::model_id(&client), "gemini-1.5-pro");
        assert_eq!(EmbeddingProvider::model_id(&client), "embedding-001");
        assert_eq!(client.dimensions(), 768);
    }
}
