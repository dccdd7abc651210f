use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use rolegate_core::policy::Decision;
use rolegate_core::RoleGateError;

use crate::app_state::AppState;
use crate::context::Identity;
use crate::error::ApiError;

use super::table::RouteAuthz;

/// Per-request authorization (runs after `authenticate`).
///
/// - `OPTIONS` passes through untouched.
/// - No matched route template means the policy can't be resolved: 400.
/// - Routes without an enforced policy continue.
/// - Otherwise the engine decides; deny is 403.
pub async fn authorize(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let Some(path) = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_owned()) else {
        state.metrics().bad_requests.inc(&[]);
        tracing::warn!(uri = %req.uri(), "no matched route for authorization lookup");
        return ApiError(RoleGateError::BadRequest("route could not be resolved".into())).into_response();
    };

    let policy = match state.routes().lookup(req.method(), &path) {
        Some(RouteAuthz::Enforce(p)) => Arc::clone(p),
        Some(RouteAuthz::Skip) | None => return next.run(req).await,
    };

    let identity = req.extensions().get::<Arc<Identity>>().cloned();
    let subject = identity.as_ref().map(|i| i.subject.as_str()).unwrap_or("-");

    match state.engine().decide(identity.as_ref().map(|i| &i.principal), &policy) {
        Decision::Allow => {
            state.metrics().decisions.inc(&[("outcome", "allow"), ("reason", "granted")]);
            tracing::debug!(method = %req.method(), route = %path, subject, "authorized");
            next.run(req).await
        }
        Decision::Deny(reason) => {
            state.metrics().decisions.inc(&[("outcome", "deny"), ("reason", reason.as_str())]);
            tracing::info!(method = %req.method(), route = %path, subject, %reason, "forbidden");
            ApiError(RoleGateError::Forbidden(reason)).into_response()
        }
    }
}
