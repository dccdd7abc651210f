//! Access decision engine.
//!
//! Pure function over `(GlobalConfig, Principal, RoutePolicy)`. No I/O, no
//! shared mutable state; call it inline from any number of request tasks.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RoleGateError};

use super::model::{GlobalConfig, Principal, RoutePolicy};

/// Identifier axis a route policy can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Role,
    Function,
    Feature,
    Subfeature,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Role => "role",
            Axis::Function => "function",
            Axis::Feature => "feature",
            Axis::Subfeature => "subfeature",
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The route policy names an identifier the deployment never declared.
    UnknownIdentifier { axis: Axis, id: String },
    /// No authenticated principal on the request.
    MissingPrincipal,
    /// Principal holds none of the required roles/function.
    RoleMismatch,
    /// Principal holds neither the required feature nor subfeature.
    FeatureMismatch,
}

impl DenyReason {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::UnknownIdentifier { .. } => "unknown_identifier",
            DenyReason::MissingPrincipal => "missing_principal",
            DenyReason::RoleMismatch => "role_mismatch",
            DenyReason::FeatureMismatch => "feature_mismatch",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::UnknownIdentifier { axis, id } => {
                write!(f, "route references undeclared {} \"{id}\"", axis.as_str())
            }
            DenyReason::MissingPrincipal => f.write_str("no authenticated principal"),
            DenyReason::RoleMismatch => f.write_str("principal lacks the required role or function"),
            DenyReason::FeatureMismatch => {
                f.write_str("principal lacks the required feature or subfeature")
            }
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(RoleGateError::Forbidden(reason)),
        }
    }
}

/// Engine bound to one deployment's `GlobalConfig`.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    config: Arc<GlobalConfig>,
}

impl AccessEngine {
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn decide(&self, principal: Option<&Principal>, policy: &RoutePolicy) -> Decision {
        decide(&self.config, principal, policy)
    }
}

/// Evaluate `principal` against `policy`.
///
/// Order: identifier whitelist, principal presence, role/function check,
/// feature check. A check that the policy does not configure passes.
pub fn decide(config: &GlobalConfig, principal: Option<&Principal>, policy: &RoutePolicy) -> Decision {
    if let Err(reason) = check_whitelist(config, policy) {
        return Decision::Deny(reason);
    }

    let Some(principal) = principal else {
        return Decision::Deny(DenyReason::MissingPrincipal);
    };

    if !grants_match(principal, policy) {
        return Decision::Deny(DenyReason::RoleMismatch);
    }
    if !features_match(principal, policy) {
        return Decision::Deny(DenyReason::FeatureMismatch);
    }
    Decision::Allow
}

fn check_whitelist(config: &GlobalConfig, policy: &RoutePolicy) -> std::result::Result<(), DenyReason> {
    let unknown = |axis: Axis, id: &str| DenyReason::UnknownIdentifier { axis, id: id.to_string() };

    if let Some(req) = policy.role() {
        if let Some(id) = req.identifiers().iter().find(|r| !config.roles().permits(r)) {
            return Err(unknown(Axis::Role, id));
        }
    }
    if let Some(f) = policy.function() {
        if !config.functions().permits(f) {
            return Err(unknown(Axis::Function, f));
        }
    }
    // Feature identifiers only matter while feature validation is on.
    if policy.validate_feature() {
        if let Some(f) = policy.feature() {
            if !config.features().permits(f) {
                return Err(unknown(Axis::Feature, f));
            }
        }
        if let Some(s) = policy.subfeature() {
            if !config.subfeatures().permits(s) {
                return Err(unknown(Axis::Subfeature, s));
            }
        }
    }
    Ok(())
}

/// Role/function axis. A role requirement (`roles` list or single `role`)
/// takes precedence; `function` is consulted only when no role is named.
fn grants_match(principal: &Principal, policy: &RoutePolicy) -> bool {
    match policy.role() {
        Some(req) => req.is_satisfied_by(principal),
        None => policy.function().map_or(true, |f| principal.has_function(f)),
    }
}

fn features_match(principal: &Principal, policy: &RoutePolicy) -> bool {
    if !policy.has_feature_requirement() {
        return true;
    }
    let by_feature = policy.feature().is_some_and(|f| principal.has_feature(f));
    let by_subfeature = policy.subfeature().is_some_and(|s| principal.has_subfeature(s));
    by_feature || by_subfeature
}
