//! EstateDesk application wiring
//!
//! Builds the session and request stack from [`Config`](estatedesk_domain::Config)
//! and exposes it to the host (the `estatedesk` binary, or an embedding UI).

pub mod context;
pub mod utils;

pub use context::AppContext;
