//! Streaming chat consumer
//!
//! Issues a natural-language query against the platform's ask endpoint,
//! consumes the incrementally produced text body, and exposes it to the
//! caller as it grows, with prompt, idempotent cancellation.

mod decode;
mod session;
mod stream;

pub use decode::{BodyDecoder, Utf8StreamDecoder};
pub use session::{ChatSession, SessionState};
pub use stream::{ChatClient, StreamHandle, CONVERSATION_ID_HEADER};
