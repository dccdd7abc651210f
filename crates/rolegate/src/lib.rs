//! Top-level facade crate for rolegate.
//!
//! Re-exports the decision core and the axum gateway so users can depend on a single crate.

pub mod core {
    pub use rolegate_core::*;
}

pub mod gateway {
    pub use rolegate_gateway::*;
}
