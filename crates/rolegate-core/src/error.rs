//! Shared error type across rolegate crates.

use std::fmt;

use thiserror::Error;

use crate::policy::engine::DenyReason;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// A route policy or the plugin options failed schema validation.
    SchemaViolation,
    /// An authorized route has no authentication configured.
    AuthPrecondition,
    /// Access denied by the decision engine.
    Forbidden,
    /// Policy lookup failed at request time.
    BadRequest,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::SchemaViolation => "SCHEMA_VIOLATION",
            ClientCode::AuthPrecondition => "AUTH_PRECONDITION",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status equivalent. Startup-only kinds never reach a client,
    /// so they map to 500.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::Forbidden => 403,
            ClientCode::BadRequest => 400,
            ClientCode::SchemaViolation | ClientCode::AuthPrecondition | ClientCode::Internal => 500,
        }
    }
}

/// Which schema a payload was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Per-route authorization policy.
    Route,
    /// Plugin-wide options (`GlobalConfig`).
    Plugin,
}

impl PolicyKind {
    /// Lowercase name used in `SchemaViolation` messages.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Route => "route",
            PolicyKind::Plugin => "plugin",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed schema constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Offending field (`<root>` when the payload itself is malformed).
    pub field: String,
    pub message: String,
}

impl Violation {
    /// Violation on `field`; `message` reads as a predicate of the field
    /// (e.g. `is not allowed`).
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.message)
    }
}

/// Joined violation list used by the `SchemaViolation` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    /// Offending field names, in the order they were reported. A field that
    /// broke several constraints appears once per violation.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.field.as_str())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RoleGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RoleGateError {
    #[error("invalid {kind} options: {violations}")]
    SchemaViolation { kind: PolicyKind, violations: Violations },
    /// `route` is carried for callers; hosts prefix it to the message.
    #[error("authorization can be enabled only for secured routes")]
    AuthPrecondition { route: String },
    #[error("forbidden: {0}")]
    Forbidden(DenyReason),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RoleGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RoleGateError::SchemaViolation { .. } => ClientCode::SchemaViolation,
            RoleGateError::AuthPrecondition { .. } => ClientCode::AuthPrecondition,
            RoleGateError::Forbidden(_) => ClientCode::Forbidden,
            RoleGateError::BadRequest(_) => ClientCode::BadRequest,
            RoleGateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Violations carried by a `SchemaViolation`, empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            RoleGateError::SchemaViolation { violations, .. } => &violations.0,
            _ => &[],
        }
    }
}
