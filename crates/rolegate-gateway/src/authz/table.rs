//! Route table compilation (startup validation pass).
//!
//! Every declared route is checked once, before the server binds:
//! - the path template must be well formed and must not clash with an
//!   earlier template or an ops endpoint (axum would panic at mount time)
//! - an enforced policy needs authentication (server default or per-route)
//! - the policy must pass the core's closed schema
//!
//! The first failure aborts startup and names the route.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::http::Method;

use rolegate_core::error::RoleGateError;
use rolegate_core::policy::{validate_route_declaration, RoutePolicy};

use crate::config::{AuthSetting, RouteConfig};
use crate::error::StartupError;
use crate::ops;

/// Authorization state of one route.
#[derive(Debug, Clone)]
pub enum RouteAuthz {
    /// No policy declared, or declared as `false`.
    Skip,
    Enforce(Arc<RoutePolicy>),
}

/// Immutable `(method, path template) -> RouteAuthz` lookup.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: HashMap<(Method, String), RouteAuthz>,
}

impl RouteTable {
    pub fn compile(default_auth: Option<&str>, routes: &[RouteConfig]) -> Result<Self, StartupError> {
        let mut entries = HashMap::with_capacity(routes.len());
        let mut templates: Vec<(&str, Vec<Segment<'_>>)> = ops::RESERVED_PATHS
            .iter()
            .filter_map(|&p| parse_template(p).ok().map(|segs| (p, segs)))
            .collect();

        for r in routes {
            let route = r.label();
            let wrap = |source: RoleGateError| StartupError::Route {
                route: route.clone(),
                source,
            };

            let method = r.http_method().map_err(wrap)?;
            if !templates.iter().any(|(p, _)| *p == r.path) {
                let segs = check_template(&r.path, &templates).map_err(wrap)?;
                templates.push((r.path.as_str(), segs));
            } else if ops::RESERVED_PATHS.contains(&r.path.as_str()) {
                return Err(wrap(RoleGateError::BadRequest(format!(
                    "path {} is reserved for an operational endpoint",
                    r.path
                ))));
            }
            let authz = compile_route(default_auth, r).map_err(wrap)?;

            match &authz {
                RouteAuthz::Skip => tracing::info!(route = %route, "route registered (authorization off)"),
                RouteAuthz::Enforce(p) => tracing::info!(route = %route, policy = ?p, "route registered"),
            }
            entries.insert((method, r.path.clone()), authz);
        }
        Ok(Self { entries })
    }

    /// Resolve a matched route. `HEAD` falls back to the `GET` entry since
    /// axum serves `HEAD` through `GET` handlers.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteAuthz> {
        let key = (method.clone(), path.to_string());
        self.entries.get(&key).or_else(|| {
            if *method == Method::HEAD {
                self.entries.get(&(Method::GET, key.1))
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct path templates with the methods registered on each, ordered
    /// by path.
    pub fn paths(&self) -> BTreeMap<&str, Vec<&Method>> {
        let mut out: BTreeMap<&str, Vec<&Method>> = BTreeMap::new();
        for (method, path) in self.entries.keys() {
            out.entry(path.as_str()).or_default().push(method);
        }
        out
    }
}

fn compile_route(default_auth: Option<&str>, r: &RouteConfig) -> rolegate_core::Result<RouteAuthz> {
    let declared = !matches!(
        r.authorization,
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false))
    );
    if declared {
        check_auth_precondition(default_auth, r)?;
    }

    Ok(match validate_route_declaration(r.authorization.as_ref())? {
        Some(policy) => RouteAuthz::Enforce(Arc::new(policy)),
        None => RouteAuthz::Skip,
    })
}

/// A route enforcing authorization must be authenticated.
///
/// With a server default, only an explicit `auth: false` breaks the rule;
/// without one, the route must name its own strategy.
pub fn check_auth_precondition(default_auth: Option<&str>, r: &RouteConfig) -> rolegate_core::Result<()> {
    let secured = match (&r.auth, default_auth) {
        (AuthSetting::Strategy(_), _) => true,
        (AuthSetting::Inherit, Some(_)) => true,
        (AuthSetting::Inherit, None) | (AuthSetting::Disabled, _) => false,
    };
    if secured {
        Ok(())
    } else {
        Err(RoleGateError::AuthPrecondition { route: r.label() })
    }
}

/// One `/`-separated piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    /// `:name`, matches one non-empty segment.
    Param(&'a str),
    /// `*name`, matches the rest of the path.
    CatchAll(&'a str),
}

fn parse_template(path: &str) -> Result<Vec<Segment<'_>>, String> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(format!("path {path} must start with '/'"));
    };
    let raw: Vec<&str> = rest.split('/').collect();
    let last = raw.len() - 1;

    let mut out = Vec::with_capacity(raw.len());
    for (i, seg) in raw.iter().copied().enumerate() {
        let parsed = if let Some(name) = seg.strip_prefix(':') {
            Segment::Param(name)
        } else if let Some(name) = seg.strip_prefix('*') {
            if i != last {
                return Err(format!("catch-all \"{seg}\" must be the last segment of {path}"));
            }
            Segment::CatchAll(name)
        } else {
            Segment::Static(seg)
        };

        match parsed {
            Segment::Param(name) | Segment::CatchAll(name) if name.is_empty() => {
                return Err(format!("parameter \"{seg}\" in {path} has no name"));
            }
            Segment::Param(name) | Segment::CatchAll(name) if name.contains([':', '*']) => {
                return Err(format!("parameter \"{seg}\" in {path} is malformed"));
            }
            Segment::Static(s) if s.contains([':', '*']) => {
                return Err(format!("':' and '*' may only start a segment (\"{seg}\" in {path})"));
            }
            _ => {}
        }
        out.push(parsed);
    }
    Ok(out)
}

/// Parse `path` and make sure the router can hold it next to every
/// template accepted so far.
fn check_template<'a>(
    path: &'a str,
    accepted: &[(&str, Vec<Segment<'_>>)],
) -> rolegate_core::Result<Vec<Segment<'a>>> {
    let segs = parse_template(path).map_err(RoleGateError::BadRequest)?;
    if let Some((other, _)) = accepted.iter().find(|(_, o)| conflicts(&segs, o)) {
        return Err(RoleGateError::BadRequest(format!(
            "path {path} conflicts with route path {other}"
        )));
    }
    Ok(segs)
}

/// Whether two distinct templates would clash in axum's router.
///
/// Differing static segments, and a static segment next to a parameter,
/// coexist (static wins). Parameters with different names at the same
/// position, and a catch-all next to anything else, do not.
fn conflicts(a: &[Segment<'_>], b: &[Segment<'_>]) -> bool {
    for (x, y) in a.iter().zip(b) {
        match (x, y) {
            _ if x == y => continue,
            (Segment::Static(_), Segment::Static(_))
            | (Segment::Static(_), Segment::Param(_))
            | (Segment::Param(_), Segment::Static(_)) => return false,
            _ => return true,
        }
    }
    false
}
