//! Bulk upload pipeline
//!
//! Given a set of files, the pipeline obtains one presigned write destination
//! per file from the backend, streams each file's bytes to that destination
//! with per-chunk progress reporting, and aggregates a success/failure
//! partition. One file's failure never aborts the rest of the batch.
//!
//! Files are processed strictly sequentially: each transfer is awaited before
//! the next acquisition starts. This bounds backend load and keeps progress
//! accounting per-file; the final partition preserves input order.

use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::error::{Result, VeridocError};
use crate::upload::types::{
    BulkUploadResult, Destination, FailedUpload, UploadEvent, UploadFile, UploadedDocument,
};

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Observer invoked once per meaningful progress change while a batch runs.
pub type BatchObserver = Arc<dyn Fn(UploadEvent) + Send + Sync>;

/// Per-chunk progress callback; receives percent complete, monotone 0-100.
pub type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;

/// Request body for the destination-acquisition endpoint
#[derive(Debug, serde::Serialize)]
struct AcquireRequest<'a> {
    filename: &'a str,
    content_type: &'a str,
}

/// Bulk upload pipeline
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use veridoc::config::Config;
/// use veridoc::credentials::StaticCredentials;
/// use veridoc::upload::{UploadFile, UploadPipeline};
///
/// # async fn example() -> veridoc::error::Result<()> {
/// let config = Config::default();
/// let pipeline = UploadPipeline::new(&config, Arc::new(StaticCredentials::new("token")))?;
/// let files = vec![UploadFile::new("a.pdf", "application/pdf", &b"%PDF-1.4"[..])];
/// let result = pipeline
///     .run_batch(&files, Arc::new(|event| println!("{:?}", event)))
///     .await?;
/// assert_eq!(result.total(), 1);
/// # Ok(())
/// # }
/// ```
pub struct UploadPipeline {
    client: Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
    chunk_size: usize,
    max_file_size: u64,
}

impl UploadPipeline {
    /// Create a new pipeline from configuration and a credential provider.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .user_agent("veridoc/0.3.0")
            .build()
            .map_err(|e| VeridocError::Transfer(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api.base_url.trim_end_matches('/').to_string(),
            credentials,
            // A zero chunk size would make chunking divide by zero.
            chunk_size: config.upload.chunk_size.max(1),
            max_file_size: config.upload.max_file_size,
        })
    }

    /// Ask the backend for a single-use upload destination for one file.
    ///
    /// The bearer token is resolved before any network call; a missing token
    /// fails here without touching the wire.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Credentials` when no token is available and
    /// `VeridocError::Acquisition` when the backend rejects the request.
    pub async fn acquire_destination(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<Destination> {
        let token = self.credentials.access_token().await?;

        let url = format!("{}/documents/upload-url", self.api_base);
        tracing::debug!(file_name, "Requesting upload destination");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&AcquireRequest {
                filename: file_name,
                content_type,
            })
            .send()
            .await
            .map_err(|e| {
                VeridocError::Acquisition(format!("Failed to request upload destination: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(file_name, %status, "Upload destination rejected");
            return Err(VeridocError::Acquisition(format!(
                "Backend returned HTTP {}: {}",
                status.as_u16(),
                body
            ))
            .into());
        }

        let destination: Destination = response.json().await.map_err(|e| {
            VeridocError::Acquisition(format!("Failed to parse destination response: {}", e))
        })?;

        tracing::debug!(file_name, file_id = %destination.file_id, "Acquired upload destination");
        Ok(destination)
    }

    /// Stream one file's bytes to its destination with a binary PUT.
    ///
    /// Transfer parameters embedded in the destination URL's query string
    /// (content type, ownership metadata) are re-attached as request headers
    /// and removed from the PUT query string; signature parameters stay on
    /// the URL untouched. `on_progress` is invoked once per body chunk with
    /// percent complete; the final value for a successful transfer is
    /// exactly 100.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Transfer` on a non-success response or a
    /// network failure.
    pub async fn transfer(
        &self,
        file: &UploadFile,
        destination: &Destination,
        on_progress: ProgressFn,
    ) -> Result<()> {
        let (put_url, headers) = split_transfer_params(&destination.upload_url)?;

        let total = file.data.len();
        let mut request = self.client.put(put_url).headers(headers);

        if total == 0 {
            on_progress(100.0);
            request = request.body(Vec::new());
        } else {
            let chunks = chunk_bytes(&file.data, self.chunk_size);
            let mut sent = 0usize;
            let progress = Arc::clone(&on_progress);
            let body_stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
                sent += chunk.len();
                let percent = (sent as f32 / total as f32) * 100.0;
                progress(percent.min(100.0));
                Ok::<Bytes, std::io::Error>(chunk)
            }));
            request = request.body(reqwest::Body::wrap_stream(body_stream));
        }

        let response = request
            .send()
            .await
            .map_err(|e| VeridocError::Transfer(format!("PUT failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(file_name = %file.name, %status, "Transfer rejected");
            return Err(VeridocError::Transfer(format!(
                "Destination returned HTTP {}: {}",
                status.as_u16(),
                body
            ))
            .into());
        }

        tracing::debug!(file_name = %file.name, bytes = total, "Transfer complete");
        Ok(())
    }

    /// Run a batch of uploads sequentially, isolating per-file failures.
    ///
    /// For each file: acquire a destination, report 0% via the observer,
    /// stream the bytes with per-chunk progress, then report the terminal
    /// state. A failure at either step is captured in the `failed` list and
    /// the next file still runs.
    ///
    /// The returned aggregate satisfies
    /// `successful.len() + failed.len() == files.len()`, with both lists in
    /// input order.
    pub async fn run_batch(
        &self,
        files: &[UploadFile],
        observer: BatchObserver,
    ) -> Result<BulkUploadResult> {
        let mut result = BulkUploadResult::default();

        for file in files {
            observer(UploadEvent::Started {
                file_name: file.name.clone(),
            });

            match self.upload_one(file, &observer).await {
                Ok(document) => {
                    observer(UploadEvent::Completed {
                        file_name: file.name.clone(),
                        file_id: document.file_id.clone(),
                    });
                    result.successful.push(document);
                }
                Err(e) => {
                    let error = e.to_string();
                    tracing::warn!(file_name = %file.name, error = %error, "Upload failed");
                    observer(UploadEvent::Failed {
                        file_name: file.name.clone(),
                        error: error.clone(),
                    });
                    result.failed.push(FailedUpload {
                        file_name: file.name.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            successful = result.successful.len(),
            failed = result.failed.len(),
            "Batch finished"
        );
        Ok(result)
    }

    async fn upload_one(
        &self,
        file: &UploadFile,
        observer: &BatchObserver,
    ) -> Result<UploadedDocument> {
        if file.data.len() as u64 > self.max_file_size {
            return Err(VeridocError::Transfer(format!(
                "File exceeds maximum size of {} bytes",
                self.max_file_size
            ))
            .into());
        }

        let destination = self
            .acquire_destination(&file.name, &file.content_type)
            .await?;

        observer(UploadEvent::Progress {
            file_name: file.name.clone(),
            percent: 0.0,
        });

        let file_name = file.name.clone();
        let forward = Arc::clone(observer);
        let on_progress: ProgressFn = Arc::new(move |percent| {
            forward(UploadEvent::Progress {
                file_name: file_name.clone(),
                percent,
            });
        });

        self.transfer(file, &destination, on_progress).await?;

        Ok(UploadedDocument {
            file_name: file.name.clone(),
            file_id: destination.file_id,
            s3_key: destination.s3_key,
        })
    }
}

/// Split a presigned upload URL into the PUT target and the headers carrying
/// its embedded transfer parameters.
///
/// `Content-Type` and `x-amz-meta-*` query parameters become request headers
/// and are dropped from the query string; every other parameter (signature,
/// expiry) is preserved verbatim.
fn split_transfer_params(upload_url: &str) -> Result<(Url, HeaderMap)> {
    let url = Url::parse(upload_url)
        .map_err(|e| VeridocError::Transfer(format!("Invalid upload URL: {}", e)))?;

    let mut headers = HeaderMap::new();
    let mut kept: Vec<(String, String)> = Vec::new();

    for (key, value) in url.query_pairs() {
        let is_content_type = key.eq_ignore_ascii_case("content-type");
        let is_meta = key.to_ascii_lowercase().starts_with("x-amz-meta-");

        if is_content_type || is_meta {
            let name = if is_content_type {
                CONTENT_TYPE
            } else {
                HeaderName::from_bytes(key.to_ascii_lowercase().as_bytes()).map_err(|e| {
                    VeridocError::Transfer(format!("Invalid transfer parameter '{}': {}", key, e))
                })?
            };
            let value = HeaderValue::from_str(&value).map_err(|e| {
                VeridocError::Transfer(format!("Invalid transfer parameter value: {}", e))
            })?;
            headers.insert(name, value);
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    let mut put_url = url;
    put_url.set_query(None);
    if !kept.is_empty() {
        let mut pairs = put_url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
    }

    Ok((put_url, headers))
}

/// Slice a byte buffer into transport chunks of at most `chunk_size` bytes.
fn chunk_bytes(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(data.len().div_ceil(chunk_size));
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + chunk_size).min(data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }
    chunks
}
