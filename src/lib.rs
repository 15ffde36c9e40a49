//! Veridoc - document-governance platform client library
//!
//! This library provides the client-side functionality for the Veridoc
//! platform: bulk document upload, streamed question answering, and thin
//! typed wrappers around the verify/predict/auth endpoints.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `upload`: presigned-destination acquisition, chunked binary transfer
//!   with progress reporting, and batch aggregation
//! - `chat`: streamed query/answer consumer with decompression, incremental
//!   UTF-8 decoding, and cancellation
//! - `api`: thin typed wrappers for the remaining backend endpoints
//! - `credentials`: bearer-token access as an injected capability
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use veridoc::config::Config;
//! use veridoc::credentials::StaticCredentials;
//! use veridoc::upload::{UploadFile, UploadPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let pipeline = UploadPipeline::new(&config, Arc::new(StaticCredentials::new("token")))?;
//!     let files = vec![UploadFile::new("a.pdf", "application/pdf", &b"%PDF-1.4"[..])];
//!     let result = pipeline.run_batch(&files, Arc::new(|_| {})).await?;
//!     println!("{} uploaded", result.successful.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod upload;

// Re-export commonly used types
pub use chat::{ChatClient, ChatSession, SessionState, StreamHandle};
pub use config::Config;
pub use credentials::{CredentialProvider, KeyringCredentials, StaticCredentials};
pub use error::{Result, VeridocError};
pub use upload::{BulkUploadResult, UploadFile, UploadPipeline};
