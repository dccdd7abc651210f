//! Shared application state for the rolegate gateway.
//!
//! Built once at startup from the parsed config; everything inside is
//! immutable afterwards and shared across request tasks via `Arc`.

use std::sync::Arc;

use rolegate_core::policy::{validate_plugin, AccessEngine};
use serde_json::Value;

use crate::authz::RouteTable;
use crate::config::{AuthSetting, GatewayConfig};
use crate::context::CredentialStore;
use crate::error::StartupError;
use crate::obs::metrics::GatewayMetrics;

/// Auth strategies this gateway can resolve.
const SUPPORTED_STRATEGIES: [&str; 1] = ["bearer"];

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    engine: AccessEngine,
    routes: RouteTable,
    credentials: CredentialStore,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Validate plugin options and every route, then build the state.
    /// Any error here is fatal: the server must not start.
    pub fn new(cfg: GatewayConfig) -> Result<Self, StartupError> {
        // 1) Plugin options -> GlobalConfig
        let options = cfg.authorization.clone().unwrap_or(Value::Null);
        let global = validate_plugin(&options).map_err(StartupError::Plugin)?;
        tracing::info!(roles = ?global.roles(), "authorization options loaded");

        // 2) Route table (auth precondition + route schema)
        let default_auth = cfg.server.default_auth.as_deref();
        let routes = RouteTable::compile(default_auth, &cfg.routes)?;

        // 3) Strategy sanity check: only warn, the route stays registered.
        let named = default_auth.into_iter().chain(cfg.routes.iter().filter_map(|r| match &r.auth {
            AuthSetting::Strategy(s) => Some(s.as_str()),
            _ => None,
        }));
        for s in named {
            if !SUPPORTED_STRATEGIES.contains(&s) {
                tracing::warn!(strategy = %s, "auth strategy has no resolver in this gateway");
            }
        }

        let credentials = CredentialStore::new(&cfg.principals);
        tracing::info!(routes = routes.len(), principals = credentials.len(), "startup validation passed");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                engine: AccessEngine::new(Arc::new(global)),
                routes,
                credentials,
                metrics: GatewayMetrics::default(),
                cfg,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn engine(&self) -> &AccessEngine {
        &self.inner.engine
    }

    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }
}
