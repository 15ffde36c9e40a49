//! Digitize endpoints
//!
//! Uploaded documents are OCR-processed server-side; these wrappers only
//! list and inspect the results.

use crate::api::ApiClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side processing state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Failed,
}

/// One digitized document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: String,
    pub s3_key: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Response from `GET /documents`
#[derive(Debug, Deserialize)]
struct DocumentListResponse {
    documents: Vec<Document>,
}

impl ApiClient {
    /// List the caller's documents.
    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        let response: DocumentListResponse = self.get_json("/documents").await?;
        tracing::debug!(count = response.documents.len(), "Listed documents");
        Ok(response.documents)
    }

    /// Fetch one document by id.
    pub async fn get_document(&self, file_id: &str) -> Result<Document> {
        self.get_json(&format!("/documents/{}", file_id)).await
    }

    /// Delete one document by id.
    pub async fn delete_document(&self, file_id: &str) -> Result<()> {
        tracing::info!(file_id, "Deleting document");
        self.delete(&format!("/documents/{}", file_id)).await
    }
}
