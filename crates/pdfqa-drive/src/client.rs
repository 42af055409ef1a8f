//! Google Drive v3 client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use pdfqa_core::{DocumentSource, Error, PDF_MIME_TYPE, Result, SourceFile};

use crate::auth::{DRIVE_READONLY_SCOPE, TokenProvider};
use crate::config::DriveConfig;

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// Drive client reading PDFs with a service account
pub struct DriveClient {
    config: DriveConfig,
    client: Client,
    tokens: TokenProvider,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

impl DriveClient {
    /// Create a new Drive client from configuration
    pub fn new(config: DriveConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let tokens = TokenProvider::new(
            config.credentials.clone(),
            DRIVE_READONLY_SCOPE,
            client.clone(),
        );

        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    /// Create a new Drive client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = DriveConfig::from_env()?;
        Self::new(config)
    }

    /// Drive search expression selecting the PDFs directly inside a folder
    pub fn folder_query(folder_id: &str) -> String {
        format!(
            "'{}' in parents and mimeType='{}' and trashed=false",
            folder_id.replace('\'', "\\'"),
            PDF_MIME_TYPE
        )
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.config.api_url.trim_end_matches('/'))
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Api {
                service: "drive",
                status,
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl DocumentSource for DriveClient {
    async fn list_pdfs(&self, folder_id: &str) -> Result<Vec<SourceFile>> {
        if folder_id.trim().is_empty() {
            return Err(Error::InvalidInput("Drive folder ID is empty".to_string()));
        }

        let url = self.files_url();
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("q", Self::folder_query(folder_id)),
                ("fields", LIST_FIELDS.to_string()),
                ("pageSize", self.config.page_size.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: FileList = self
                .get(&url, &query)
                .await?
                .json()
                .await
                .map_err(|e| Error::Serialization(e.to_string()))?;

            debug!(folder = folder_id, count = page.files.len(), "Listed Drive page");

            files.extend(page.files.into_iter().map(|f| SourceFile {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type.unwrap_or_else(|| PDF_MIME_TYPE.to_string()),
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn download(&self, file: &SourceFile) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.files_url(), file.id);
        let bytes = self
            .get(&url, &[("alt", "media".to_string())])
            .await?
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        debug!(file = %file.name, bytes = bytes.len(), "Downloaded Drive file");
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "drive"
    }
}
