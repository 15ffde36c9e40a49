//! Verify endpoints
//!
//! Fraud scoring is an opaque remote service; these wrappers submit a
//! document for verification and fetch the resulting report.

use crate::api::ApiClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall verdict of a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Authentic,
    Suspicious,
    Fraudulent,
}

/// One flagged anomaly in a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub detail: String,
}

/// Response from `POST /verify`
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationSubmission {
    pub report_id: String,
    pub status: String,
}

/// Completed verification report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub report_id: String,
    pub file_id: String,
    /// 0.0 (clean) to 1.0 (certain fraud)
    pub risk_score: f32,
    pub verdict: Verdict,
    #[serde(default)]
    pub findings: Vec<Finding>,
    pub completed_at: DateTime<Utc>,
}

/// Request body for `POST /verify`
#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    file_id: &'a str,
}

impl ApiClient {
    /// Submit a document for fraud verification.
    pub async fn submit_verification(&self, file_id: &str) -> Result<VerificationSubmission> {
        tracing::info!(file_id, "Submitting verification");
        self.post_json("/verify", &VerifyRequest { file_id }).await
    }

    /// Fetch a verification report by id.
    pub async fn get_report(&self, report_id: &str) -> Result<VerificationReport> {
        self.get_json(&format!("/verify/{}", report_id)).await
    }
}
