//! Bulk upload pipeline
//!
//! Orchestrates per-file acquisition of a presigned upload destination, the
//! binary transfer with progress reporting, and aggregation of the batch
//! outcome. See [`UploadPipeline`] for the entry point.

mod pipeline;
mod types;

pub use pipeline::{BatchObserver, ProgressFn, UploadPipeline};
pub use types::{
    content_type_for, BulkUploadResult, Destination, FailedUpload, UploadEvent, UploadFile,
    UploadStatus, UploadTask, UploadedDocument,
};
