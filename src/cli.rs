//! Command-line interface definition for Veridoc
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, bulk upload, streamed questions,
//! verification, and forecasting.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Veridoc - document-governance platform client
///
/// Digitize, verify, question, and forecast over your documents from the
/// terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "veridoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the backend API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Veridoc
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage the stored session
    Auth {
        /// Authentication subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Upload files or directories for digitization
    Upload {
        /// Files or directories to upload (directories are walked,
        /// honoring .gitignore)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Force a MIME content type instead of guessing per file
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Ask a question and stream the answer
    Ask {
        /// The question to ask
        query: String,

        /// Continue an existing conversation
        #[arg(short = 'n', long)]
        conversation: Option<String>,
    },

    /// Submit documents for fraud verification
    Verify {
        /// Verification subcommand
        #[command(subcommand)]
        command: VerifyCommand,
    },

    /// Request a forecast from a document's extracted figures
    Predict {
        /// Document to forecast from
        document_id: String,

        /// Number of periods to forecast
        #[arg(long, default_value_t = 3)]
        horizon: u32,
    },

    /// Inspect digitized documents
    Documents {
        /// Document subcommand
        #[command(subcommand)]
        command: DocumentCommand,
    },
}

/// Authentication subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Log in and store the session token in the OS keyring
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password (read from VERIDOC_PASSWORD or prompted when omitted)
        #[arg(short, long, env = "VERIDOC_PASSWORD")]
        password: Option<String>,
    },

    /// Show whether a usable session is stored
    Status,

    /// Invalidate and forget the stored session
    Logout,
}

/// Verification subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum VerifyCommand {
    /// Submit a document for verification
    Submit {
        /// Document to verify
        file_id: String,
    },

    /// Fetch a completed verification report
    Report {
        /// Report identifier
        report_id: String,
    },
}

/// Document subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DocumentCommand {
    /// List your documents
    List,

    /// Show one document
    Show {
        /// Document identifier
        file_id: String,
    },

    /// Delete one document
    Delete {
        /// Document identifier
        file_id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_base: None,
            verbose: false,
            command: Commands::Auth {
                command: AuthCommand::Status,
            },
        }
    }
}
