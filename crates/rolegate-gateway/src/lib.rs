//! rolegate gateway library entry.
//!
//! Wires strict config loading, the startup route validation pass, bearer
//! authentication, and the per-request authorization middleware around the
//! `rolegate-core` decision engine. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod authz;
pub mod config;
pub mod context;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
