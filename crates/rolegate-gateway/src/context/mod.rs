//! Request identity context shared across layers.
//!
//! Authentication sits outside the decision core: this module only resolves
//! a credential to an `Identity` and stores it in request extensions, where
//! the authorization middleware picks it up.

pub mod identity;

pub use identity::{authenticate, CredentialStore, Identity};
