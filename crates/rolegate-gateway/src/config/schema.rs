use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use rolegate_core::error::{Result, RoleGateError};
use rolegate_core::policy::Principal;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    /// Plugin options, handed untyped to the core validator.
    #[serde(default)]
    pub authorization: Option<Value>,

    #[serde(default)]
    pub principals: Vec<PrincipalEntry>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RoleGateError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;

        let mut seen = HashSet::new();
        for r in &self.routes {
            r.validate()?;
            if !seen.insert((r.method.to_ascii_uppercase(), r.path.as_str())) {
                return Err(RoleGateError::BadRequest(format!(
                    "duplicate route: {} {}",
                    r.method, r.path
                )));
            }
        }

        let mut tokens = HashSet::new();
        for p in &self.principals {
            if p.token.is_empty() {
                return Err(RoleGateError::BadRequest(format!(
                    "principals[{}].token must not be empty",
                    p.subject
                )));
            }
            if !tokens.insert(p.token.as_str()) {
                return Err(RoleGateError::BadRequest(format!(
                    "duplicate principal token for subject {}",
                    p.subject
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Server-wide authentication strategy applied to routes that don't set one.
    #[serde(default)]
    pub default_auth: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            default_auth: None,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.default_auth.as_deref() == Some("") {
            return Err(RoleGateError::BadRequest(
                "server.default_auth must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            RoleGateError::BadRequest(format!("server.listen is not a socket address: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Demo credential record resolved by the bearer strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalEntry {
    pub token: String,
    pub subject: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub subfeatures: Vec<String>,
}

impl PrincipalEntry {
    pub fn to_principal(&self) -> Principal {
        Principal::default()
            .with_roles(self.roles.iter().cloned())
            .with_functions(self.functions.iter().cloned())
            .with_features(self.features.iter().cloned())
            .with_subfeatures(self.subfeatures.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub method: String,
    pub path: String,

    #[serde(default, deserialize_with = "de_auth")]
    pub auth: AuthSetting,

    /// Route policy, `false`, or absent. Validated by the core at startup.
    #[serde(default)]
    pub authorization: Option<Value>,
}

impl RouteConfig {
    pub fn validate(&self) -> Result<()> {
        self.http_method()?;
        if !self.path.starts_with('/') {
            return Err(RoleGateError::BadRequest(format!(
                "route path must start with '/': {}",
                self.path
            )));
        }
        Ok(())
    }

    pub fn http_method(&self) -> Result<Method> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| RoleGateError::BadRequest(format!("invalid route method: {}", self.method)))
    }

    /// `METHOD /path`, used in logs and startup errors.
    pub fn label(&self) -> String {
        format!("{} {}", self.method.to_ascii_uppercase(), self.path)
    }
}

/// Per-route authentication setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthSetting {
    /// Not declared: the server default (if any) applies.
    #[default]
    Inherit,
    /// `auth: false` or `auth: null`.
    Disabled,
    /// Named strategy.
    Strategy(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuth {
    Flag(bool),
    Strategy(String),
}

fn de_auth<'de, D>(d: D) -> std::result::Result<AuthSetting, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAuth>::deserialize(d)? {
        None | Some(RawAuth::Flag(false)) => Ok(AuthSetting::Disabled),
        Some(RawAuth::Strategy(s)) if !s.is_empty() => Ok(AuthSetting::Strategy(s)),
        Some(_) => Err(de::Error::custom("auth must be a strategy name or false")),
    }
}
