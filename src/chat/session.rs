//! Chat session lifecycle
//!
//! [`ChatSession`] owns one streamed exchange end to end: it issues the
//! query, accumulates fragments as they arrive, republishes the latest
//! accumulated text to the caller, and settles into exactly one terminal
//! state. Cancellation keeps the text accumulated so far; a failure replaces
//! it with a fixed user-facing message.

use crate::chat::stream::ChatClient;
use crate::error::Result;
use tokio_util::sync::CancellationToken;

/// Per-session state machine
///
/// `Idle -> Requesting -> Streaming -> {Completed | Failed | Cancelled}`.
/// Terminal states are mutually exclusive and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    /// True for `Completed`, `Failed`, and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// One end-to-end streamed chat exchange.
pub struct ChatSession {
    state: SessionState,
    conversation_id: Option<String>,
    accumulated: String,
    last_error: Option<String>,
    cancel: CancellationToken,
    failure_message: String,
}

impl ChatSession {
    /// Create an idle session.
    ///
    /// `conversation_id` scopes the query to an existing conversation;
    /// `failure_message` is the replacement text applied when the stream
    /// fails (not when it is cancelled).
    pub fn new(conversation_id: Option<String>, failure_message: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            conversation_id,
            accumulated: String::new(),
            last_error: None,
            cancel: CancellationToken::new(),
            failure_message: failure_message.into(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Latest accumulated (or replaced) message content.
    pub fn content(&self) -> &str {
        &self.accumulated
    }

    /// Resolved conversation id, once known.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// The error that failed the session, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True while fragments may still arrive.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self.state,
            SessionState::Requesting | SessionState::Streaming
        )
    }

    /// Token that external callers (a Ctrl-C handler, a UI button) may
    /// cancel at any time.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation. Idempotent: cancelling an already-completed or
    /// already-cancelled session is a no-op.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run the exchange to its terminal state.
    ///
    /// `publish` is invoked with the latest accumulated content after each
    /// received fragment (at-least-once delivery of the final value; a UI
    /// may coalesce intermediate ones). Errors are absorbed into the session
    /// state per the platform's surfacing rules: the content is replaced by
    /// the failure message and the session ends `Failed`. Cancellation ends
    /// the session `Cancelled` with the accumulated content intact.
    pub async fn run(
        &mut self,
        client: &ChatClient,
        query: &str,
        mut publish: impl FnMut(&str),
    ) -> Result<()> {
        self.state = SessionState::Requesting;

        // Cancellation races the header wait, so a cancel issued while the
        // backend is still thinking returns right away instead of blocking
        // on the request timeout.
        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.state = SessionState::Cancelled;
                return Ok(());
            }
            sent = client.send_query(query, self.conversation_id.as_deref(), self.cancel.clone()) => sent,
        };

        let mut handle = match sent {
            Ok(handle) => handle,
            Err(e) => {
                if self.cancel.is_cancelled() {
                    self.state = SessionState::Cancelled;
                    return Ok(());
                }
                tracing::warn!(error = %e, "Chat request failed");
                self.fail(e.to_string(), &mut publish);
                return Ok(());
            }
        };

        if handle.conversation_id.is_some() {
            self.conversation_id = handle.conversation_id.clone();
        }
        self.state = SessionState::Streaming;

        loop {
            // A cancel also preempts fragments already queued in the
            // channel; nothing is appended after it fires.
            let fragment = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                fragment = handle.next_fragment() => fragment,
            };
            match fragment {
                Some(Ok(text)) => {
                    self.accumulated.push_str(&text);
                    publish(&self.accumulated);
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Chat stream failed");
                    self.fail(e.to_string(), &mut publish);
                    return Ok(());
                }
                None => break,
            }
        }

        if self.cancel.is_cancelled() {
            // Accumulated content stays as-is; growth simply stops.
            self.state = SessionState::Cancelled;
        } else {
            self.state = SessionState::Completed;
        }
        Ok(())
    }

    fn fail(&mut self, error: String, publish: &mut impl FnMut(&str)) {
        self.last_error = Some(error);
        self.accumulated = self.failure_message.clone();
        self.state = SessionState::Failed;
        publish(&self.accumulated);
    }
}
