//! Session management commands

use crate::api::ApiClient;
use crate::config::Config;
use crate::credentials::{CredentialProvider, KeyringCredentials};
use crate::error::{Result, VeridocError};

use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Log in and store the session token in the OS keyring.
///
/// The password comes from the `--password` flag, the `VERIDOC_PASSWORD`
/// environment variable, or an interactive prompt, in that order.
pub async fn login(config: Config, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    let credentials = KeyringCredentials::new();
    let api = ApiClient::new(&config, Arc::new(credentials.clone()))?;

    let token = api.login(&email, &password).await?;
    credentials.store_token(&token.access_token)?;

    println!("{}", format!("Logged in as {}", email).green());
    if let Some(expires_in) = token.expires_in {
        println!("Session expires in {} seconds", expires_in);
    }
    Ok(())
}

/// Show whether a usable session is stored.
pub async fn status(config: Config) -> Result<()> {
    let credentials = Arc::new(KeyringCredentials::new());

    if credentials.access_token().await.is_err() {
        println!("{}", "Not logged in".yellow());
        return Ok(());
    }

    let api = ApiClient::new(&config, credentials)?;
    match api.me().await {
        Ok(profile) => {
            println!("{}", format!("Logged in as {}", profile.email).green());
            if let Some(name) = profile.name {
                println!("Name: {}", name);
            }
        }
        Err(e) => {
            println!("{}", format!("Stored session is not usable: {}", e).red());
        }
    }
    Ok(())
}

/// Invalidate the session server-side and forget the stored token.
pub async fn logout(config: Config) -> Result<()> {
    let credentials = KeyringCredentials::new();
    let api = ApiClient::new(&config, Arc::new(credentials.clone()))?;

    // Best effort: the token may already be expired server-side.
    if let Err(e) = api.logout().await {
        tracing::warn!(error = %e, "Server-side logout failed");
    }

    credentials.clear_token()?;
    println!("{}", "Logged out".green());
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout()
        .flush()
        .map_err(VeridocError::Io)?;

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(VeridocError::Io)?;

    let password = password.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(VeridocError::Credentials("Password must not be empty".to_string()).into());
    }
    Ok(password)
}
