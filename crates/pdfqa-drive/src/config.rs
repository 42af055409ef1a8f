//! Drive configuration

use pdfqa_core::{Error, Result};
use std::env;

use crate::auth::ServiceAccountKey;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com";

/// Configuration for the Drive client
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub credentials: ServiceAccountKey,
    pub api_url: String,
    pub page_size: u32,
}

impl DriveConfig {
    /// Create configuration from environment variables.
    ///
    /// The service account key is taken inline from
    /// `GOOGLE_SERVICE_ACCOUNT_JSON`, or read from the file named by
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let credentials = if let Ok(json) = env::var("GOOGLE_SERVICE_ACCOUNT_JSON") {
            ServiceAccountKey::from_json(&json)?
        } else if let Ok(path) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                Error::Configuration(format!("Cannot read credentials file {}: {}", path, e))
            })?;
            ServiceAccountKey::from_json(&json)?
        } else {
            return Err(Error::Configuration(
                "GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_APPLICATION_CREDENTIALS environment variable not found"
                    .to_string(),
            ));
        };

        let api_url = env::var("DRIVE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            credentials,
            api_url,
            page_size: 100,
        })
    }

    /// Create configuration with explicit values
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            credentials,
            api_url: DEFAULT_API_URL.to_string(),
            page_size: 100,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
