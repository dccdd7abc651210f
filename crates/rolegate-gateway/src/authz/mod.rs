//! Route authorization layer.
//!
//! `table` compiles declared route policies once at startup (fatal on any
//! invalid declaration); `middleware` applies the core decision engine to each
//! request against that immutable table.

pub mod middleware;
pub mod table;

pub use middleware::authorize;
pub use table::{check_auth_precondition, RouteAuthz, RouteTable};
