//! Authorization policy: model, closed-schema validation, decision engine.
//!
//! - `model`: principal grants, route policy, plugin options.
//! - `schema`: field-by-field validation of untyped declarations.
//! - `engine`: the per-request allow/deny decision.
//!
//! Nothing here panics on malformed declarations; every failure surfaces as
//! a `RoleGateError` so startup can report it and halt cleanly.

pub mod engine;
pub mod model;
pub mod schema;

pub use engine::{decide, AccessEngine, Axis, Decision, DenyReason};
pub use model::{GlobalConfig, Principal, RoleRequirement, RoutePolicy, Whitelist, DEFAULT_ROLES};
pub use schema::{validate, validate_plugin, validate_route, validate_route_declaration, Validated};
