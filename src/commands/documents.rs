//! Document inspection commands

use crate::api::{ApiClient, DocumentStatus};
use crate::config::Config;
use crate::credentials::KeyringCredentials;
use crate::error::Result;

use colored::Colorize;
use std::sync::Arc;

/// List the caller's documents.
pub async fn list(config: Config) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let documents = api.list_documents().await?;

    if documents.is_empty() {
        println!("No documents yet. Upload some with: veridoc upload <paths>");
        return Ok(());
    }

    for document in &documents {
        let status = match document.status {
            DocumentStatus::Ready => "ready".green(),
            DocumentStatus::Processing => "processing".yellow(),
            DocumentStatus::Failed => "failed".red(),
        };
        println!(
            "{}  {:<12}  {}  {}",
            document.file_id.bold(),
            status,
            document.uploaded_at.format("%Y-%m-%d %H:%M"),
            document.file_name
        );
    }
    Ok(())
}

/// Show one document.
pub async fn show(config: Config, file_id: String) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let document = api.get_document(&file_id).await?;

    println!("File id:     {}", document.file_id);
    println!("File name:   {}", document.file_name);
    println!("Storage key: {}", document.s3_key);
    println!("Status:      {:?}", document.status);
    println!("Uploaded at: {}", document.uploaded_at);
    if let Some(pages) = document.pages {
        println!("Pages:       {}", pages);
    }
    Ok(())
}

/// Delete one document.
pub async fn delete(config: Config, file_id: String) -> Result<()> {
    let api = ApiClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    api.delete_document(&file_id).await?;
    println!("{}", format!("Deleted {}", file_id).green());
    Ok(())
}
