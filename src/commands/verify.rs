//! Fraud-verification commands

use crate::api::{ApiClient, Verdict};
use crate::config::Config;
use crate::credentials::KeyringCredentials;
use crate::error::Result;

use colored::Colorize;
use std::sync::Arc;

/// Submit a document for verification.
pub async fn submit(config: Config, file_id: String) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let submission = api.submit_verification(&file_id).await?;

    println!(
        "Verification {} for document {} ({})",
        submission.report_id.bold(),
        file_id,
        submission.status
    );
    println!("Fetch the result with: veridoc verify report {}", submission.report_id);
    Ok(())
}

/// Fetch and print a completed verification report.
pub async fn report(config: Config, report_id: String) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let report = api.get_report(&report_id).await?;

    let verdict = match report.verdict {
        Verdict::Authentic => "authentic".green(),
        Verdict::Suspicious => "suspicious".yellow(),
        Verdict::Fraudulent => "fraudulent".red(),
    };

    println!("Report {} for document {}", report.report_id.bold(), report.file_id);
    println!("Verdict: {} (risk score {:.2})", verdict, report.risk_score);
    println!("Completed at: {}", report.completed_at);

    if report.findings.is_empty() {
        println!("No findings.");
    } else {
        println!("Findings:");
        for finding in &report.findings {
            println!("  {} {}", finding.code.yellow(), finding.detail);
        }
    }
    Ok(())
}
