//! Pinecone configuration

use pdfqa_core::{Error, IndexSpec, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_CONTROLLER_URL: &str = "https://api.pinecone.io";
pub const API_VERSION: &str = "2024-07";

/// Configuration for the Pinecone client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: String,
    pub controller_url: String,
    pub index: IndexSpec,
    pub namespace: Option<String>,
    /// How many times to poll a freshly created index before giving up
    pub ready_poll_attempts: u32,
    pub ready_poll_interval: Duration,
}

impl PineconeConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(None)
    }

    /// Like `from_env`, for an embedder producing `embed_dimensions` values.
    ///
    /// An unset `PINECONE_DIMENSION` follows the embedder; a different one is
    /// rejected.
    pub fn from_env_for_embeddings(embed_dimensions: usize) -> Result<Self> {
        Self::from_env_with(Some(embed_dimensions))
    }

    fn from_env_with(embed_dimensions: Option<usize>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("PINECONE_API_KEY").map_err(|_| {
            Error::Configuration("PINECONE_API_KEY environment variable not found".to_string())
        })?;

        let defaults = IndexSpec::default();
        let raw_dimension = env::var("PINECONE_DIMENSION").ok();
        let dimension = resolve_dimension(raw_dimension.as_deref(), embed_dimensions)?;

        let index = IndexSpec {
            name: env::var("PINECONE_INDEX_NAME").unwrap_or(defaults.name),
            dimension,
            metric: env::var("PINECONE_METRIC").unwrap_or(defaults.metric),
            cloud: env::var("PINECONE_CLOUD").unwrap_or(defaults.cloud),
            region: env::var("PINECONE_REGION").unwrap_or(defaults.region),
        };

        let controller_url = env::var("PINECONE_CONTROLLER_URL")
            .unwrap_or_else(|_| DEFAULT_CONTROLLER_URL.to_string());

        let namespace = env::var("PINECONE_NAMESPACE")
            .ok()
            .filter(|ns| !ns.is_empty());

        Ok(Self {
            api_key,
            controller_url,
            index,
            namespace,
            ..Self::new("")
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            index: IndexSpec::default(),
            namespace: None,
            ready_poll_attempts: 60,
            ready_poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = url.into();
        self
    }

    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.index = index;
        self
    }
}

/// Index dimension from `PINECONE_DIMENSION`, checked against the embedder
pub(crate) fn resolve_dimension(
    raw: Option<&str>,
    embed_dimensions: Option<usize>,
) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(embed_dimensions.unwrap_or(IndexSpec::default().dimension));
    };

    let dimension: usize = raw.trim().parse().map_err(|_| {
        Error::Configuration(format!("PINECONE_DIMENSION is not a number: {}", raw))
    })?;

    match embed_dimensions {
        Some(expected) if expected != dimension => Err(Error::Configuration(format!(
            "PINECONE_DIMENSION is {} but the embedding model produces {} values",
            dimension, expected
        ))),
        _ => Ok(dimension),
    }
}
