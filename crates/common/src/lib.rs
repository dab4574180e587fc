//! Modular common utilities shared across Orbu crates.
//!
//! Currently hosts the time abstraction used by the connection pool, the
//! endpoint executor and the retention service so that idle expiry and
//! retention cutoffs can be driven deterministically in tests.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

// Re-export commonly used types and traits for convenience
pub use time::{Clock, MockClock, SystemClock};
