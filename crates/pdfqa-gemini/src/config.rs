//! Gemini configuration

use pdfqa_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EMBED_MODEL: &str = "embedding-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMBED_DIMENSIONS: usize = 768;

/// Configuration for the Gemini client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub embed_dimensions: usize,
}

impl GeminiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                Error::Configuration(
                    "API_KEY or GOOGLE_API_KEY environment variable not found".to_string(),
                )
            })?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let embed_model =
            env::var("GEMINI_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());

        let chat_model =
            env::var("GEMINI_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        let embed_dimensions = match env::var("GEMINI_EMBED_DIMENSIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Configuration(format!("GEMINI_EMBED_DIMENSIONS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_EMBED_DIMENSIONS,
        };

        Ok(Self {
            api_key,
            api_url,
            embed_model,
            chat_model,
            embed_dimensions,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embed_dimensions: DEFAULT_EMBED_DIMENSIONS,
        }
    }

    /// Point the client at a different endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
