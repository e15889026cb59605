//! # Parley Core Library
//!
//! Client-side AI service layer for the Parley creator inbox.
//!
//! The hosted backend (document database, local notifications, the
//! categorization function) is reached only through the traits in
//! [`traits`], so every service runs in-process against
//! [`store::MemoryDocumentStore`] and a [`clock::ManualClock`] in tests.
//!
//! ## Architecture
//!
//! - **cache**: per-user AI result cache with an operation TTL table
//! - **rate_limit**: hourly / daily calendar-window counters with 80% warnings
//! - **telemetry**: latency, success and cost of every AI call
//! - **categorize**: categorization endpoint client with bounded retries
//! - **ai_service**: the call path tying the above together
//! - **scoring** / **health**: pure priority and creator-health heuristics
//! - **ab_test**: variant assignment and per-arm comparison
//! - **boundary**, **messaging**, **settings**: creator-facing records
//!
//! Side writes (cache, hit counters, metrics, A/B samples) go through
//! [`tasks::BackgroundQueue`] and never fail the caller.

pub mod error;

pub mod clock;
pub mod config;
pub mod store;
pub mod tasks;
pub mod traits;
pub mod types;

pub mod ab_test;
pub mod ai_service;
pub mod boundary;
pub mod cache;
pub mod categorize;
pub mod health;
pub mod messaging;
pub mod rate_limit;
pub mod scoring;
pub mod settings;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test;

pub use error::{ParleyError, Result};

pub use ab_test::{AbTestService, Variant};
pub use ai_service::AiService;
pub use cache::AiCache;
pub use categorize::CategorizerClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigLoader, ParleyConfig};
pub use messaging::MessagingService;
pub use rate_limit::RateLimiter;
pub use store::MemoryDocumentStore;
pub use tasks::BackgroundQueue;
pub use telemetry::PerformanceTracker;
