//! Data types for the bulk upload pipeline

use crate::error::{Result, VeridocError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-file lifecycle state
///
/// A task is created `Pending`, moves to `Uploading` once a destination has
/// been acquired, and terminates in `Completed` or `Failed`. A retry creates
/// a new task; terminal states are never revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Failed,
}

/// One file's journey through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTask {
    /// File name, unique within a batch
    pub file_name: String,
    /// Backend-assigned identifier, empty until a destination is acquired
    #[serde(default)]
    pub file_id: String,
    /// Percent complete, 0-100
    pub progress: f32,
    /// Current lifecycle state
    pub status: UploadStatus,
    /// Failure message for `Failed` tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadTask {
    /// Create a task in the `Pending` state.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_id: String::new(),
            progress: 0.0,
            status: UploadStatus::Pending,
            error: None,
        }
    }

    /// Apply a live pipeline event to this task.
    ///
    /// Events for other files are ignored.
    pub fn apply(&mut self, event: &UploadEvent) {
        if event.file_name() != self.file_name {
            return;
        }
        match event {
            UploadEvent::Started { .. } => {
                self.status = UploadStatus::Pending;
            }
            UploadEvent::Progress { percent, .. } => {
                self.status = UploadStatus::Uploading;
                self.progress = *percent;
            }
            UploadEvent::Completed { file_id, .. } => {
                self.status = UploadStatus::Completed;
                self.file_id = file_id.clone();
                self.progress = 100.0;
            }
            UploadEvent::Failed { error, .. } => {
                self.status = UploadStatus::Failed;
                self.error = Some(error.clone());
            }
        }
    }
}

/// Live progress event emitted by the pipeline while a batch runs
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// Processing of a file has begun
    Started { file_name: String },
    /// Transfer progress tick; `percent` is monotone 0-100 per file
    Progress { file_name: String, percent: f32 },
    /// File reached its terminal success state
    Completed { file_name: String, file_id: String },
    /// File reached its terminal failure state
    Failed { file_name: String, error: String },
}

impl UploadEvent {
    /// Name of the file this event refers to.
    pub fn file_name(&self) -> &str {
        match self {
            UploadEvent::Started { file_name }
            | UploadEvent::Progress { file_name, .. }
            | UploadEvent::Completed { file_name, .. }
            | UploadEvent::Failed { file_name, .. } => file_name,
        }
    }
}

/// Backend-issued, single-use write target for one file's bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    /// Fully-qualified presigned PUT URL; may embed transfer parameters
    /// (content type, ownership metadata) as query parameters
    pub upload_url: String,
    /// Backend-assigned document identifier
    pub file_id: String,
    /// Storage key under which the bytes land
    pub s3_key: String,
}

/// Successful upload descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub file_name: String,
    pub file_id: String,
    pub s3_key: String,
}

/// Failed upload descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// Aggregate outcome of one batch
///
/// Every input file appears in exactly one of the two lists, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkUploadResult {
    pub successful: Vec<UploadedDocument>,
    pub failed: Vec<FailedUpload>,
}

impl BulkUploadResult {
    /// Total number of files that reached a terminal state.
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    /// True when no file failed.
    pub fn is_all_successful(&self) -> bool {
        self.failed.is_empty()
    }
}

/// In-memory file handed to the pipeline
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// File name sent to the acquisition endpoint
    pub name: String,
    /// MIME content type sent to the acquisition endpoint
    pub content_type: String,
    /// Raw file bytes
    pub data: Bytes,
}

impl UploadFile {
    /// Create a file from in-memory bytes.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Io` if the file cannot be read, or
    /// `VeridocError::Api` if the path has no usable file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VeridocError::Api(format!("Invalid file path: {}", path.display())))?
            .to_string();
        let data = std::fs::read(path).map_err(VeridocError::Io)?;
        let content_type = content_type_for(&name).to_string();
        Ok(Self {
            name,
            content_type,
            data: Bytes::from(data),
        })
    }
}

/// Map a file name to the MIME type the backend expects.
///
/// Unknown extensions fall back to `application/octet-stream`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_starts_pending() {
        let task = UploadTask::new("a.pdf");
        assert_eq!(task.status, UploadStatus::Pending);
        assert_eq!(task.progress, 0.0);
        assert!(task.file_id.is_empty());
        assert!(task.error.is_none());
    }

    #[test]
    fn test_task_apply_progress_moves_to_uploading() {
        let mut task = UploadTask::new("a.pdf");
        task.apply(&UploadEvent::Progress {
            file_name: "a.pdf".to_string(),
            percent: 40.0,
        });
        assert_eq!(task.status, UploadStatus::Uploading);
        assert_eq!(task.progress, 40.0);
    }

    #[test]
    fn test_task_apply_completed_sets_file_id_and_full_progress() {
        let mut task = UploadTask::new("a.pdf");
        task.apply(&UploadEvent::Completed {
            file_name: "a.pdf".to_string(),
            file_id: "doc-1".to_string(),
        });
        assert_eq!(task.status, UploadStatus::Completed);
        assert_eq!(task.file_id, "doc-1");
        assert_eq!(task.progress, 100.0);
    }

    #[test]
    fn test_task_apply_failed_records_error() {
        let mut task = UploadTask::new("a.pdf");
        task.apply(&UploadEvent::Failed {
            file_name: "a.pdf".to_string(),
            error: "HTTP 403".to_string(),
        });
        assert_eq!(task.status, UploadStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("HTTP 403"));
    }

    #[test]
    fn test_task_ignores_events_for_other_files() {
        let mut task = UploadTask::new("a.pdf");
        task.apply(&UploadEvent::Progress {
            file_name: "b.pdf".to_string(),
            percent: 90.0,
        });
        assert_eq!(task.status, UploadStatus::Pending);
        assert_eq!(task.progress, 0.0);
    }

    #[test]
    fn test_bulk_result_totals() {
        let mut result = BulkUploadResult::default();
        assert_eq!(result.total(), 0);
        assert!(result.is_all_successful());

        result.successful.push(UploadedDocument {
            file_name: "a.pdf".to_string(),
            file_id: "doc-1".to_string(),
            s3_key: "uploads/doc-1".to_string(),
        });
        result.failed.push(FailedUpload {
            file_name: "b.pdf".to_string(),
            error: "rejected".to_string(),
        });
        assert_eq!(result.total(), 2);
        assert!(!result.is_all_successful());
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("scan.pdf"), "application/pdf");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
    }

    #[test]
    fn test_content_type_for_unknown_extension() {
        assert_eq!(content_type_for("blob.xyz"), "application/octet-stream");
        assert_eq!(content_type_for("noextension"), "application/octet-stream");
    }

    #[test]
    fn test_upload_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.name, "invoice.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.data.as_ref(), b"%PDF-1.4");
    }

    #[test]
    fn test_upload_status_serde_snake_case() {
        let json = serde_json::to_string(&UploadStatus::Uploading).unwrap();
        assert_eq!(json, "\"uploading\"");
    }
}
