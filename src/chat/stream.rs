//! Streaming chat transport
//!
//! [`ChatClient::send_query`] posts a natural-language query and resolves as
//! soon as response headers are available. The body is consumed by a spawned
//! reader task that decompresses and UTF-8-decodes each transport chunk,
//! forwarding text fragments over an mpsc channel until end-of-stream, an
//! error, or cancellation. A [`tokio_util::sync::CancellationToken`] stops
//! the reader promptly; any partial chunk queued for decode at that point is
//! dropped, so no fragment is observed after a cancel.

use crate::chat::decode::{BodyDecoder, Utf8StreamDecoder};
use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::error::{Result, VeridocError};

use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// Response header carrying the server-assigned or continued conversation id.
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

/// Request body for the chat-query endpoint
#[derive(Debug, Serialize)]
struct ChatQueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// One streamed exchange, handed back once response headers arrive.
///
/// Fragments are a finite, one-directional sequence; the handle is not
/// restartable. The stream ends without an error entry when the transport
/// signals end-of-stream or the session is cancelled.
#[derive(Debug)]
pub struct StreamHandle {
    /// Conversation id from the response header, falling back to the
    /// caller-supplied id; `None` when neither exists.
    pub conversation_id: Option<String>,
    fragments: mpsc::Receiver<Result<String>>,
}

impl StreamHandle {
    /// Await the next text fragment. `None` means the stream has terminated.
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        self.fragments.recv().await
    }

    /// Consume the handle into a `Stream` of fragments.
    pub fn into_fragments(self) -> ReceiverStream<Result<String>> {
        ReceiverStream::new(self.fragments)
    }
}

/// Streaming chat client
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use veridoc::chat::ChatClient;
/// use veridoc::config::Config;
/// use veridoc::credentials::StaticCredentials;
///
/// # async fn example() -> veridoc::error::Result<()> {
/// let config = Config::default();
/// let client = ChatClient::new(&config, Arc::new(StaticCredentials::new("token")))?;
/// let mut handle = client
///     .send_query("What does this contract cover?", None, CancellationToken::new())
///     .await?;
/// while let Some(fragment) = handle.next_fragment().await {
///     print!("{}", fragment?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    client: Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ChatClient {
    /// Create a new chat client from configuration and a credential provider.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.chat.request_timeout_seconds))
            .user_agent("veridoc/0.3.0")
            .build()
            .map_err(|e| VeridocError::Stream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Submit a query, optionally scoped to an existing conversation.
    ///
    /// Resolves once response headers are available, not once the body has
    /// been read. The returned handle's fragments are produced by a spawned
    /// reader task that `cancel` stops promptly and idempotently.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Credentials` when no token is available and
    /// `VeridocError::Request` (with status code and body text) when the
    /// backend responds with a non-success status.
    pub async fn send_query(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<StreamHandle> {
        let token = self.credentials.access_token().await?;

        let url = format!("{}/chat/query", self.api_base);
        tracing::debug!(conversation_id, "Sending chat query");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ChatQueryRequest {
                query,
                conversation_id,
            })
            .send()
            .await
            .map_err(VeridocError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Chat query rejected");
            return Err(VeridocError::Request {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let resolved_conversation_id = response
            .headers()
            .get(CONVERSATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .or_else(|| conversation_id.map(|s| s.to_string()));

        let content_encoding = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body_decoder = BodyDecoder::for_content_encoding(content_encoding.as_deref())?;

        let (tx, rx) = mpsc::channel(32);
        let byte_stream = response.bytes_stream();
        tokio::spawn(consume_body(byte_stream, body_decoder, tx, cancel));

        Ok(StreamHandle {
            conversation_id: resolved_conversation_id,
            fragments: rx,
        })
    }
}

/// Reader task: turn transport chunks into text fragments until the body
/// ends, an error occurs, or the token is cancelled.
async fn consume_body<S>(
    mut byte_stream: S,
    mut body_decoder: BodyDecoder,
    tx: mpsc::Sender<Result<String>>,
    cancel: CancellationToken,
) where
    S: futures::Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin,
{
    let mut utf8 = Utf8StreamDecoder::new();

    loop {
        tokio::select! {
            // Cancellation wins over an already-buffered chunk.
            biased;
            _ = cancel.cancelled() => {
                // Deliberate early termination: drop any partial chunk still
                // queued for decode and deliver nothing further.
                tracing::debug!("Chat stream cancelled");
                return;
            }
            next = byte_stream.next() => match next {
                Some(Ok(chunk)) => {
                    let decoded = match body_decoder.push(&chunk) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    };
                    let text = utf8.push(&decoded);
                    if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                        return;
                    }
                }
                Some(Err(e)) => {
                    let _ = tx
                        .send(Err(VeridocError::Stream(format!(
                            "Failed to read response body: {}",
                            e
                        ))
                        .into()))
                        .await;
                    return;
                }
                None => {
                    // End of stream: flush whatever the decoders still hold.
                    let mut tail = match body_decoder.finish() {
                        Ok(bytes) => utf8.push(&bytes),
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    };
                    tail.push_str(&utf8.finish());
                    if !tail.is_empty() {
                        let _ = tx.send(Ok(tail)).await;
                    }
                    tracing::debug!("Chat stream complete");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;

    fn test_client() -> ChatClient {
        let config = Config::default();
        ChatClient::new(&config, Arc::new(StaticCredentials::new("token"))).unwrap()
    }

    #[test]
    fn test_chat_client_creation() {
        let config = Config::default();
        let client = ChatClient::new(&config, Arc::new(StaticCredentials::new("token")));
        assert!(client.is_ok());
    }

    #[test]
    fn test_chat_client_trims_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:9000/".to_string();
        let client =
            ChatClient::new(&config, Arc::new(StaticCredentials::new("token"))).unwrap();
        assert_eq!(client.api_base, "http://localhost:9000");
    }

    #[test]
    fn test_query_request_serialization() {
        let request = ChatQueryRequest {
            query: "hello",
            conversation_id: Some("conv-1"),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"hello","conversation_id":"conv-1"}"#);
    }

    #[test]
    fn test_query_request_omits_absent_conversation() {
        let request = ChatQueryRequest {
            query: "hello",
            conversation_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"hello"}"#);
    }

    #[tokio::test]
    async fn test_missing_credentials_fails_before_network() {
        let config = Config::default();
        let client = ChatClient::new(&config, Arc::new(StaticCredentials::new(""))).unwrap();
        let err = client
            .send_query("hello", None, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No access token found"));
    }

    #[tokio::test]
    async fn test_consume_body_forwards_fragments_in_order() {
        let chunks: Vec<std::result::Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::from_static(b"Hi")),
            Ok(bytes::Bytes::from_static(b" there")),
            Ok(bytes::Bytes::from_static(b"!")),
        ];
        let stream = futures::stream::iter(chunks);
        let (tx, mut rx) = mpsc::channel(8);

        consume_body(stream, BodyDecoder::Identity, tx, CancellationToken::new()).await;

        let mut text = String::new();
        while let Some(fragment) = rx.recv().await {
            text.push_str(&fragment.unwrap());
        }
        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn test_consume_body_stops_on_cancelled_token() {
        let stream = futures::stream::pending::<std::result::Result<bytes::Bytes, reqwest::Error>>();
        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        cancel.cancel();

        consume_body(stream, BodyDecoder::Identity, tx, cancel).await;

        // Cancellation delivers no fragments and no error entry.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_consume_body_carries_split_multibyte() {
        // "é" split across two transport chunks.
        let chunks: Vec<std::result::Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::from(vec![b'c', b'a', b'f', 0xC3])),
            Ok(bytes::Bytes::from(vec![0xA9])),
        ];
        let stream = futures::stream::iter(chunks);
        let (tx, mut rx) = mpsc::channel(8);

        consume_body(stream, BodyDecoder::Identity, tx, CancellationToken::new()).await;

        let mut text = String::new();
        while let Some(fragment) = rx.recv().await {
            text.push_str(&fragment.unwrap());
        }
        assert_eq!(text, "café");
    }

    #[tokio::test]
    async fn test_send_query_is_used_by_test_client_helper() {
        // Keeps the helper exercised; network behavior is covered by the
        // wiremock integration tests.
        let client = test_client();
        assert_eq!(client.api_base, "https://api.veridoc.io");
    }
}
