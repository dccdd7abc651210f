//! rolegate core: route authorization policy, validation, and access decisions.
//!
//! This crate defines the policy schema routes declare, the plugin-wide
//! identifier whitelist, and the decision engine that evaluates a principal's
//! grants against a route policy. It carries no HTTP or runtime dependencies
//! so the gateway (or any other host) can call it inline per request.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `RoleGateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod policy;

/// Shared result type.
pub use error::{Result, RoleGateError};
