//! Authorization data model: principal grants, route policy, plugin options.
//!
//! Apart from `GlobalConfig::default()`, `RoutePolicy` and `GlobalConfig` are
//! only built by the validator in [`super::schema`], so every instance in
//! circulation satisfies the closed schema. Both are immutable afterwards;
//! share them via `Arc`.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Built-in role hierarchy, highest privilege first.
/// Only membership is consulted when matching; the order is informational.
pub const DEFAULT_ROLES: [&str; 4] = ["SUPER_ADMIN", "ADMIN", "USER", "GUEST"];

/// Grants held by the authenticated user of the current request.
///
/// Owned by the upstream authentication layer; the core only reads it.
/// Other fields the upstream user object carries are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Principal {
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub functions: BTreeSet<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub subfeatures: BTreeSet<String>,
}

impl Principal {
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions.extend(functions.into_iter().map(Into::into));
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    pub fn with_subfeatures<I, S>(mut self, subfeatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subfeatures.extend(subfeatures.into_iter().map(Into::into));
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
    pub fn has_function(&self, function: &str) -> bool {
        self.functions.contains(function)
    }
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
    pub fn has_subfeature(&self, subfeature: &str) -> bool {
        self.subfeatures.contains(subfeature)
    }
}

/// Role requirement of a route: a single role or a list where any entry matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    One(String),
    AnyOf(Vec<String>),
}

impl RoleRequirement {
    /// Every role identifier the requirement names.
    pub fn identifiers(&self) -> &[String] {
        match self {
            RoleRequirement::One(role) => std::slice::from_ref(role),
            RoleRequirement::AnyOf(roles) => roles,
        }
    }

    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        self.identifiers().iter().any(|r| principal.has_role(r))
    }
}

/// Validated per-route authorization policy (defaults applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub(crate) role: Option<RoleRequirement>,
    pub(crate) function: Option<String>,
    pub(crate) feature: Option<String>,
    pub(crate) subfeature: Option<String>,
    pub(crate) validate_feature: bool,
}

impl RoutePolicy {
    pub fn role(&self) -> Option<&RoleRequirement> {
        self.role.as_ref()
    }
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }
    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }
    pub fn subfeature(&self) -> Option<&str> {
        self.subfeature.as_deref()
    }
    pub fn validate_feature(&self) -> bool {
        self.validate_feature
    }

    /// True when the role/function check applies.
    pub fn has_grant_requirement(&self) -> bool {
        self.role.is_some() || self.function.is_some()
    }

    /// True when the feature check applies.
    pub fn has_feature_requirement(&self) -> bool {
        self.validate_feature && (self.feature.is_some() || self.subfeature.is_some())
    }
}

/// Set of identifiers a deployment declares as valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Whitelist {
    /// Identifier checking turned off (`roles: false`).
    Disabled,
    Only(Vec<String>),
}

impl Whitelist {
    pub fn permits(&self, id: &str) -> bool {
        match self {
            Whitelist::Disabled => true,
            Whitelist::Only(ids) => ids.iter().any(|i| i == id),
        }
    }

    pub fn identifiers(&self) -> &[String] {
        match self {
            Whitelist::Disabled => &[],
            Whitelist::Only(ids) => ids,
        }
    }
}

/// Plugin-wide options: the identifiers routes are allowed to reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub(crate) roles: Whitelist,
    pub(crate) functions: Whitelist,
    pub(crate) features: Whitelist,
    pub(crate) subfeatures: Whitelist,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            roles: Whitelist::Only(DEFAULT_ROLES.iter().map(|r| r.to_string()).collect()),
            functions: Whitelist::Only(Vec::new()),
            features: Whitelist::Only(Vec::new()),
            subfeatures: Whitelist::Only(Vec::new()),
        }
    }
}

impl GlobalConfig {
    pub fn roles(&self) -> &Whitelist {
        &self.roles
    }
    pub fn functions(&self) -> &Whitelist {
        &self.functions
    }
    pub fn features(&self) -> &Whitelist {
        &self.features
    }
    pub fn subfeatures(&self) -> &Whitelist {
        &self.subfeatures
    }
}
