use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use rolegate_core::policy::Principal;

use crate::app_state::AppState;
use crate::config::PrincipalEntry;

/// Authenticated caller of a request (subject + grants).
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub principal: Principal,
}

/// In-memory bearer token store built from config.
#[derive(Debug, Default)]
pub struct CredentialStore {
    by_token: HashMap<String, Arc<Identity>>,
}

impl CredentialStore {
    pub fn new(entries: &[PrincipalEntry]) -> Self {
        let by_token = entries
            .iter()
            .map(|e| {
                let id = Identity {
                    subject: e.subject.clone(),
                    principal: e.to_principal(),
                };
                (e.token.clone(), Arc::new(id))
            })
            .collect();
        Self { by_token }
    }

    pub fn resolve(&self, token: &str) -> Option<Arc<Identity>> {
        self.by_token.get(token).cloned()
    }

    /// Resolve an `Authorization` header value of the form `Bearer <token>`.
    pub fn resolve_bearer(&self, header_value: &str) -> Option<Arc<Identity>> {
        let (scheme, token) = header_value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        self.resolve(token.trim())
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

/// Bearer authentication middleware.
///
/// Never rejects: an unknown or missing credential just leaves the request
/// without an `Identity`, and authorized routes then deny it.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| state.credentials().resolve_bearer(v));

    match identity {
        Some(id) => {
            tracing::debug!(subject = %id.subject, "request authenticated");
            req.extensions_mut().insert(id);
        }
        None if req.headers().contains_key(header::AUTHORIZATION) => {
            tracing::debug!("unrecognized credentials");
        }
        None => {}
    }

    next.run(req).await
}
