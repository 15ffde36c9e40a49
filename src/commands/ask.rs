//! Streamed question answering

use crate::chat::{ChatClient, ChatSession, SessionState};
use crate::config::Config;
use crate::credentials::KeyringCredentials;
use crate::error::Result;

use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Ask a question and stream the answer to stdout as it arrives.
///
/// Ctrl-C cancels the stream; whatever was printed stays on screen and the
/// command exits cleanly.
pub async fn run_ask(config: Config, query: String, conversation: Option<String>) -> Result<()> {
    let client = ChatClient::new(&config, Arc::new(KeyringCredentials::new()))?;
    let mut session = ChatSession::new(conversation, config.chat.failure_message.clone());

    // Ctrl-C cancels the in-flight stream rather than killing the process.
    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    // The session republishes the full accumulated text; print only the
    // suffix that is new since the last publish.
    let mut printed = 0usize;
    session
        .run(&client, &query, |text| {
            if text.len() >= printed && text.is_char_boundary(printed) {
                print!("{}", &text[printed..]);
            } else {
                // Content was replaced wholesale (failure path).
                println!();
                print!("{}", text);
            }
            printed = text.len();
            let _ = std::io::stdout().flush();
        })
        .await?;

    println!();
    match session.state() {
        SessionState::Completed => {
            if let Some(id) = session.conversation_id() {
                println!(
                    "{}",
                    format!("(conversation {}; use --conversation to continue)", id).dimmed()
                );
            }
        }
        SessionState::Cancelled => {
            println!("{}", "(cancelled)".yellow());
        }
        SessionState::Failed => {
            if let Some(error) = session.last_error() {
                eprintln!("{}", format!("Error: {}", error).red());
            }
        }
        _ => {}
    }

    Ok(())
}
