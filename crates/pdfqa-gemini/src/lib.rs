//! Gemini integration for pdfqa
//!
//! This crate provides the Gemini implementation of the `EmbeddingProvider`
//! and `LLMProvider` traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::GeminiConfig;

// Re-export core types for convenience
pub use pdfqa_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result, TaskType,
};
