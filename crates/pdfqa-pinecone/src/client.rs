//! Pinecone REST client

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use pdfqa_core::{
    Error, IndexSpec, Result, ScoredMatch, SearchConfig, SearchResult, VectorRecord, VectorStore,
};

use crate::config::{API_VERSION, PineconeConfig};

/// Pinecone vector store client
pub struct PineconeClient {
    config: PineconeConfig,
    client: Client,
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    host: String,
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct CreateIndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: CreateIndexSpec<'a>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a serde_json::Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredMatch>,
}

#[derive(Deserialize)]
struct FetchedVector {
    id: String,
    #[serde(default)]
    values: Vec<f32>,
    #[serde(default)]
    metadata: serde_json::Value,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, FetchedVector>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    total_vector_count: usize,
}

impl PineconeClient {
    /// Create a new Pinecone client from configuration
    pub fn new(config: PineconeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            host: None,
        })
    }

    /// Create a new Pinecone client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = PineconeConfig::from_env()?;
        Self::new(config)
    }

    /// Data-plane host of the connected index
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn config(&self) -> &PineconeConfig {
        &self.config
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .header("Accept", "application/json")
    }

    fn controller_url(&self, path: &str) -> String {
        format!("{}{}", self.config.controller_url.trim_end_matches('/'), path)
    }

    fn data_url(&self, path: &str) -> Result<String> {
        let host = self.host.as_deref().ok_or_else(|| {
            Error::VectorStore("Pinecone index not connected. Call connect() first.".to_string())
        })?;
        Ok(format!("{}{}", normalize_host(host), path))
    }

    fn namespace(&self, config_namespace: Option<&str>) -> Option<String> {
        config_namespace
            .map(str::to_string)
            .or_else(|| self.config.namespace.clone())
    }

    /// Send a request, mapping transport errors and non-2xx statuses
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(e.to_string())
            } else {
                Error::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Api {
                service: "pinecone",
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    async fn list_indexes(&self) -> Result<Vec<String>> {
        let list: IndexList = self
            .send_json(self.request(Method::GET, &self.controller_url("/indexes")))
            .await?;
        Ok(list.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let request = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        self.send(
            self.request(Method::POST, &self.controller_url("/indexes"))
                .json(&request),
        )
        .await?;

        info!(index = %spec.name, dimension = spec.dimension, "Created Pinecone index");
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexModel> {
        let path = format!("/indexes/{}", name);
        self.send_json(self.request(Method::GET, &self.controller_url(&path)))
            .await
    }

    /// Poll the control plane until the index reports ready, returning its host
    async fn wait_until_ready(&self, name: &str) -> Result<String> {
        let attempts = self.config.ready_poll_attempts.max(1);

        for attempt in 1..=attempts {
            let index = self.describe_index(name).await?;
            let ready = index.status.as_ref().is_some_and(|s| s.ready);

            if ready && !index.host.is_empty() {
                return Ok(index.host);
            }

            debug!(
                index = name,
                attempt,
                state = index.status.as_ref().map(|s| s.state.as_str()).unwrap_or("unknown"),
                "Index not ready yet"
            );

            if attempt < attempts {
                tokio::time::sleep(self.config.ready_poll_interval).await;
            }
        }

        Err(Error::Timeout(format!(
            "Pinecone index '{}' was not ready after {} checks",
            name, attempts
        )))
    }
}

/// Pinecone reports bare hostnames; tests and proxies may hand us full URLs
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorStore for PineconeClient {
    async fn connect(&mut self) -> Result<()> {
        let spec = self.config.index.clone();
        self.ensure_index(&spec).await
    }

    async fn ensure_index(&mut self, spec: &IndexSpec) -> Result<()> {
        let existing = self.list_indexes().await?;

        if !existing.iter().any(|name| name == &spec.name) {
            self.create_index(spec).await?;
        }

        let host = self.wait_until_ready(&spec.name).await?;
        debug!(index = %spec.name, host = %host, "Connected to Pinecone index");

        self.config.index = spec.clone();
        self.host = Some(host);
        Ok(())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let url = self.data_url("/vectors/upsert")?;
        let namespace = self.namespace(None);
        let request = UpsertRequest {
            vectors: &records,
            namespace: namespace.as_deref(),
        };

        let response: UpsertResponse = self
            .send_json(self.request(Method::POST, &url).json(&request))
            .await?;

        Ok(response.upserted_count)
    }

    async fn query(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let url = self.data_url("/query")?;
        let namespace = self.namespace(config.namespace.as_deref());
        let request = QueryRequest {
            vector,
            top_k: config.top_k,
            include_metadata: true,
            include_values: false,
            namespace: namespace.as_deref(),
            filter: config.filter.as_ref(),
        };

        let response: QueryResponse = self
            .send_json(self.request(Method::POST, &url).json(&request))
            .await?;

        let matches: Vec<ScoredMatch> = response
            .matches
            .into_iter()
            .filter(|m| config.score_threshold.is_none_or(|t| m.score >= t))
            .collect();
        let total = matches.len();

        Ok(SearchResult { matches, total })
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>> {
        let url = self.data_url("/vectors/fetch")?;
        let mut params = vec![("ids", id.to_string())];
        if let Some(namespace) = self.namespace(None) {
            params.push(("namespace", namespace));
        }

        let mut response: FetchResponse = self
            .send_json(self.request(Method::GET, &url).query(&params))
            .await?;

        Ok(response.vectors.remove(id).map(|v| VectorRecord {
            id: v.id,
            values: v.values,
            metadata: v.metadata,
        }))
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let url = self.data_url("/vectors/delete")?;
        let mut body = json!({ "ids": ids });
        if let Some(namespace) = self.namespace(None) {
            body["namespace"] = json!(namespace);
        }

        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let url = self.data_url("/vectors/delete")?;
        let mut body = json!({ "deleteAll": true });
        if let Some(namespace) = self.namespace(None) {
            body["namespace"] = json!(namespace);
        }

        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let url = self.data_url("/describe_index_stats")?;
        let stats: IndexStats = self
            .send_json(self.request(Method::POST, &url).json(&json!({})))
            .await?;
        Ok(stats.total_vector_count)
    }

    fn is_connected(&self) -> bool {
        self.host.is_some()
    }
}
