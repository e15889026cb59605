//! # Categorization Client
//!
//! Calls the hosted categorization function for one message and maps the
//! reply onto the error taxonomy.
//!
//! ```text
//! validate ──► POST {messageId, messageText, conversationId, senderId}
//!                 │
//!        2xx ─────┼──► CategorizationResult
//!        429/503/network ──► retry (jittered backoff, bounded)
//!        401/400/other ────► error, no retry
//! ```

pub mod client;
pub mod retry;
pub mod transport;

pub use client::{validate_request, CategorizerClient};
pub use retry::RetryPolicy;
pub use transport::ReqwestTransport;
