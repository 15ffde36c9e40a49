//! Veridoc - document-governance platform client
//!
//! Main entry point for the Veridoc CLI.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use veridoc::cli::{AuthCommand, Cli, Commands, DocumentCommand, VerifyCommand};
use veridoc::commands;
use veridoc::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommand::Login { email, password } => {
                tracing::info!("Starting login");
                commands::auth::login(config, email, password).await?;
                Ok(())
            }
            AuthCommand::Status => {
                commands::auth::status(config).await?;
                Ok(())
            }
            AuthCommand::Logout => {
                commands::auth::logout(config).await?;
                Ok(())
            }
        },
        Commands::Upload {
            paths,
            content_type,
        } => {
            tracing::info!(count = paths.len(), "Starting bulk upload");
            commands::upload::run_upload(config, paths, content_type).await?;
            Ok(())
        }
        Commands::Ask {
            query,
            conversation,
        } => {
            tracing::info!("Starting streamed question");
            if let Some(id) = &conversation {
                tracing::debug!("Continuing conversation: {}", id);
            }
            commands::ask::run_ask(config, query, conversation).await?;
            Ok(())
        }
        Commands::Verify { command } => match command {
            VerifyCommand::Submit { file_id } => {
                tracing::info!(file_id, "Submitting verification");
                commands::verify::submit(config, file_id).await?;
                Ok(())
            }
            VerifyCommand::Report { report_id } => {
                commands::verify::report(config, report_id).await?;
                Ok(())
            }
        },
        Commands::Predict {
            document_id,
            horizon,
        } => {
            tracing::info!(document_id, horizon, "Requesting forecast");
            commands::predict::run_predict(config, document_id, horizon).await?;
            Ok(())
        }
        Commands::Documents { command } => match command {
            DocumentCommand::List => {
                commands::documents::list(config).await?;
                Ok(())
            }
            DocumentCommand::Show { file_id } => {
                commands::documents::show(config, file_id).await?;
                Ok(())
            }
            DocumentCommand::Delete { file_id } => {
                commands::documents::delete(config, file_id).await?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "veridoc=debug"
    } else {
        "veridoc=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
