//! # Orbu Domain
//!
//! Business domain types and models for the Orbu gateway.
//!
//! This crate contains:
//! - Tenant, endpoint, execution and schema types
//! - The gateway error taxonomy and `Result` alias
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Orbu crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
