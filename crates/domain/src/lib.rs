//! # EstateDesk Domain
//!
//! Domain types shared by the EstateDesk client crates.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Wire types for sessions, users and properties
//! - Domain constants (endpoints, storage keys, user-facing messages)
//!
//! ## Architecture
//! - No dependencies on other EstateDesk crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
