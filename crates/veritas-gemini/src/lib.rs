//! Gemini API client: file ingestion and content generation.
//!
//! This crate provides:
//! - The [`InferenceClient`] capability the pipeline is written against
//! - [`GeminiClient`], its implementation over the Gemini REST API
//!   (resumable file upload, file state refresh, deletion, `generateContent`)
//! - Explicit configuration with a fail-fast credential check
//! - A typed error taxonomy that decides which failures are transient

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{GeminiClient, InferenceClient};
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use types::guess_mime_type;
