//! Forecast command

use crate::api::{ApiClient, ChartKind};
use crate::config::Config;
use crate::credentials::KeyringCredentials;
use crate::error::Result;

use colored::Colorize;
use std::sync::Arc;

/// Request a forecast and render it as a simple text chart.
pub async fn run_predict(config: Config, document_id: String, horizon: u32) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let series = api.request_forecast(&document_id, horizon).await?;

    println!(
        "Forecast for {} over {} period(s)",
        series.document_id.bold(),
        series.horizon
    );

    let max = series
        .points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max);

    for point in &series.points {
        let width = if max > 0.0 {
            ((point.value.abs() / max) * 40.0).round() as usize
        } else {
            0
        };
        let glyph = match series.chart {
            ChartKind::Line => "·",
            ChartKind::Bar => "#",
        };
        println!(
            "  {:>10}  {:>12.2}  {}",
            point.label,
            point.value,
            glyph.repeat(width).cyan()
        );
    }
    Ok(())
}
