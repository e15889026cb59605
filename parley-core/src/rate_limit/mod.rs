//! # Rate Limiting
//!
//! Fixed calendar-window counters per user and AI operation.
//!
//! ```rust,no_run
//! use parley_core::rate_limit::RateLimiter;
//!
//! # async fn example(limiter: RateLimiter) {
//! let status = limiter.check_limit("uid-1", "categorization").await;
//! if status.allowed {
//!     // run the operation, then count it
//!     limiter.increment("uid-1", "categorization").await;
//! } else if let Some(message) = status.message {
//!     println!("{}", message);
//! }
//! # }
//! ```

pub mod limiter;
pub mod limits;
pub mod window;

pub use limiter::{LimitReason, RateLimitStatus, RateLimiter, ResetTimes};
pub use limits::{limits_for, OperationLimits, DEFAULT_LIMITS, WARNING_THRESHOLD};
pub use window::{RateLimitWindow, WindowKind};
