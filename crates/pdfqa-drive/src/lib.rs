//! PDF document sources for pdfqa
//!
//! `DriveClient` reads PDFs out of a Google Drive folder with a service
//! account; `LocalDirectorySource` reads them from a directory on disk. Both
//! implement `DocumentSource`.

mod auth;
mod client;
mod config;
mod local;


pub use auth::{ServiceAccountKey, TokenProvider, DRIVE_READONLY_SCOPE};
pub use client::DriveClient;
pub use config::DriveConfig;
pub use local::LocalDirectorySource;

// Re-export core types for convenience
pub use pdfqa_core::{DocumentSource, Error, Result, SourceFile};
