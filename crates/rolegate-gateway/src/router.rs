//! Axum router wiring.
//!
//! Configured routes are served by an echo handler behind two route layers:
//! `authenticate` (outer) then `authorize`. Ops endpoints are merged after
//! layering so they are never subject to authorization.

use std::sync::Arc;

use axum::{
    extract::MatchedPath,
    middleware,
    routing::{get, MethodFilter, MethodRouter},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use crate::{app_state::AppState, authz, context, ops};

pub fn build_router(state: AppState) -> Router {
    let mut app: Router<AppState> = Router::new();

    for (path, methods) in state.routes().paths() {
        let mut mr: MethodRouter<AppState> = MethodRouter::new();
        for m in methods {
            match MethodFilter::try_from(m.clone()) {
                Ok(filter) => mr = mr.on(filter, echo),
                Err(_) => tracing::warn!(method = %m, path, "method not routable, skipped"),
            }
        }
        app = app.route(path, mr);
    }

    // route_layer panics on a router without routes.
    let guarded = if state.routes().is_empty() {
        app
    } else {
        app.route_layer(middleware::from_fn_with_state(state.clone(), authz::authorize))
            .route_layer(middleware::from_fn_with_state(state.clone(), context::authenticate))
    };

    let ops_routes = Router::new()
        .route(ops::HEALTHZ_PATH, get(ops::healthz))
        .route(ops::METRICS_PATH, get(ops::metrics));

    guarded.merge(ops_routes).with_state(state)
}

/// Stand-in handler for configured routes.
async fn echo(path: MatchedPath, identity: Option<Extension<Arc<context::Identity>>>) -> Json<Value> {
    Json(json!({
        "route": path.as_str(),
        "subject": identity.map(|Extension(i)| i.subject.clone()),
    }))
}
