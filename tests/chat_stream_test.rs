//! Streamed chat integration tests against a wiremock backend
//!
//! Covers conversation-id resolution, compressed-body decoding, error
//! surfacing through the session state machine, and cancellation.

use std::io::Write;
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tokio_util::sync::CancellationToken;
use veridoc::chat::{ChatClient, ChatSession, SessionState, CONVERSATION_ID_HEADER};
use veridoc::config::Config;
use veridoc::credentials::StaticCredentials;
use veridoc::error::VeridocError;

const FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while generating the answer. Please try again.";

fn chat_client(server: &MockServer) -> ChatClient {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    ChatClient::new(&config, Arc::new(StaticCredentials::new("token-1"))).unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_answer_streams_and_adopts_header_conversation_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .and(header("authorization", "Bearer token-1"))
        .and(body_string_contains("What is in the lease?"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(CONVERSATION_ID_HEADER, "conv-42")
                .set_body_string("The lease covers unit 4B."),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);
    let mut published = Vec::new();
    session
        .run(&client, "What is in the lease?", |text| {
            published.push(text.to_string())
        })
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.content(), "The lease covers unit 4B.");
    assert_eq!(session.conversation_id(), Some("conv-42"));
    assert!(session.last_error().is_none());
    // The final publish always carries the complete answer.
    assert_eq!(published.last().unwrap(), "The lease covers unit 4B.");
}

#[tokio::test]
async fn test_caller_conversation_id_survives_missing_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .and(body_string_contains("conv-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Still here."))
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(Some("conv-7".to_string()), FAILURE_MESSAGE);
    session.run(&client, "follow up", |_| {}).await.unwrap();

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.conversation_id(), Some("conv-7"));
}

#[tokio::test]
async fn test_gzip_body_decodes_to_same_answer() {
    let server = MockServer::start().await;

    let answer = "Compressed answers look identical once decoded. café 😀";
    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(gzip(answer.as_bytes())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);
    session.run(&client, "compress this", |_| {}).await.unwrap();

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.content(), answer);
}

#[tokio::test]
async fn test_backend_error_replaces_content_with_failure_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);
    let mut published = Vec::new();
    session
        .run(&client, "doomed question", |text| {
            published.push(text.to_string())
        })
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.content(), FAILURE_MESSAGE);
    let error = session.last_error().unwrap();
    assert!(error.contains("500"));
    assert!(error.contains("boom"));
    assert_eq!(published, vec![FAILURE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_rejected_query_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(ResponseTemplate::new(422).set_body_string("query too long"))
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let err = client
        .send_query("x", None, CancellationToken::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<VeridocError>() {
        Some(VeridocError::Request { status, body }) => {
            assert_eq!(*status, 422);
            assert_eq!(body, "query too long");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_pre_cancelled_session_ends_cancelled_with_content_intact() {
    let server = MockServer::start().await;

    // Delay the response so the cancel is observed before any fragment.
    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("never seen")
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);
    session.cancel();
    session.run(&client, "abort me", |_| {}).await.unwrap();

    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.content(), "");
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_transport_failure_is_http_error() {
    // A builder-made server is not pooled, so dropping it actually closes
    // the listener; `MockServer::start()` servers return to a pool and keep
    // answering 404 on the port.
    let server = MockServer::builder().start().await;
    let client = chat_client(&server);
    // Shutting the server down leaves nothing listening on the port.
    drop(server);

    let err = client
        .send_query("anyone home?", None, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<VeridocError>(),
        Some(VeridocError::Http(_))
    ));
}

#[tokio::test]
async fn test_cancel_during_header_wait_returns_promptly() {
    let server = MockServer::start().await;

    // The backend sits on the request far longer than the test allows.
    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(std::time::Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = std::time::Instant::now();
    session.run(&client, "slow question", |_| {}).await.unwrap();

    assert!(
        started.elapsed() < std::time::Duration::from_secs(1),
        "cancel should not wait out the request, took {:?}",
        started.elapsed()
    );
    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.content(), "");
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_cancel_mid_stream_keeps_received_fragments() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("First part of the answer."))
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);

    // Cancel as soon as the first fragment lands, the way a user interrupts
    // an answer that has started printing.
    let cancel = session.cancel_token();
    session
        .run(&client, "interrupt me", |_| cancel.cancel())
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Cancelled);
    // Exactly what was published before the cancel, nothing after, and no
    // failure text in its place.
    assert!(!session.content().is_empty());
    assert!("First part of the answer.".starts_with(session.content()));
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_cancel_after_completion_is_a_no_op() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&server)
        .await;

    let client = chat_client(&server);
    let mut session = ChatSession::new(None, FAILURE_MESSAGE);
    session.run(&client, "quick one", |_| {}).await.unwrap();
    assert_eq!(session.state(), SessionState::Completed);

    session.cancel();
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.content(), "done");
}
