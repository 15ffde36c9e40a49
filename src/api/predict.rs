//! Predict endpoints
//!
//! The forecasting model is an opaque remote service. The response carries a
//! tagged chart kind so the caller dispatches rendering with a plain match
//! instead of runtime component selection.

use crate::api::ApiClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How a forecast series is meant to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One forecast data point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub label: String,
    pub value: f64,
}

/// Response from `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub document_id: String,
    pub horizon: u32,
    pub chart: ChartKind,
    pub points: Vec<ForecastPoint>,
}

/// Request body for `POST /predict`
#[derive(Debug, Serialize)]
struct ForecastRequest<'a> {
    document_id: &'a str,
    horizon: u32,
}

impl ApiClient {
    /// Request a forecast derived from one document's extracted figures.
    pub async fn request_forecast(&self, document_id: &str, horizon: u32) -> Result<ForecastSeries> {
        tracing::info!(document_id, horizon, "Requesting forecast");
        self.post_json(
            "/predict",
            &ForecastRequest {
                document_id,
                horizon,
            },
        )
        .await
    }
}
