//! Startup validation pass: fatal configuration errors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::http::Method;

use rolegate_core::error::ClientCode;
use rolegate_core::RoleGateError;
use rolegate_gateway::app_state::AppState;
use rolegate_gateway::authz::RouteAuthz;
use rolegate_gateway::config;
use rolegate_gateway::error::StartupError;
use rolegate_gateway::router;

fn boot(yaml: &str) -> Result<AppState, StartupError> {
    AppState::new(config::load_from_str(yaml).unwrap())
}

fn route_error(err: StartupError) -> (String, RoleGateError) {
    match err {
        StartupError::Route { route, source } => (route, source),
        other => panic!("expected route error, got {other:?}"),
    }
}

#[test]
fn authorized_route_without_any_auth_is_fatal() {
    let err = boot(
        r#"
version: 1
routes:
  - method: GET
    path: /admin
    authorization: { role: ADMIN, validateFeature: false }
"#,
    )
    .err()
    .expect("must fail");

    assert_eq!(err.core().client_code(), ClientCode::AuthPrecondition);
    let (route, source) = route_error(err);
    assert_eq!(route, "GET /admin");
    assert!(matches!(source, RoleGateError::AuthPrecondition { route } if route == "GET /admin"));
}

#[test]
fn route_disabling_auth_under_default_is_fatal() {
    let err = boot(
        r#"
version: 1
server: { default_auth: bearer }
routes:
  - method: GET
    path: /admin
    auth: false
    authorization: { role: ADMIN, validateFeature: false }
"#,
    )
    .err()
    .expect("must fail");
    assert_eq!(err.core().client_code(), ClientCode::AuthPrecondition);
}

#[test]
fn per_route_strategy_satisfies_precondition() {
    let state = boot(
        r#"
version: 1
routes:
  - method: GET
    path: /admin
    auth: bearer
    authorization: { role: ADMIN, validateFeature: false }
"#,
    )
    .unwrap();
    assert!(matches!(
        state.routes().lookup(&Method::GET, "/admin"),
        Some(RouteAuthz::Enforce(_))
    ));
}

#[test]
fn disabled_policy_needs_no_auth() {
    let state = boot(
        r#"
version: 1
routes:
  - { method: GET, path: /open, authorization: false }
  - { method: GET, path: /plain }
"#,
    )
    .unwrap();
    assert!(matches!(state.routes().lookup(&Method::GET, "/open"), Some(RouteAuthz::Skip)));
    assert!(matches!(state.routes().lookup(&Method::GET, "/plain"), Some(RouteAuthz::Skip)));
}

#[test]
fn invalid_route_policy_is_fatal_and_named() {
    let err = boot(
        r#"
version: 1
server: { default_auth: bearer }
routes:
  - { method: GET, path: /ok, authorization: { feature: billing } }
  - { method: DELETE, path: /users/:id, authorization: { role: ADMIN, roles: [ADMIN] } }
"#,
    )
    .err()
    .expect("must fail");

    let msg = err.to_string();
    assert!(msg.starts_with("route DELETE /users/:id:"), "{msg}");
    let (_, source) = route_error(err);
    assert_eq!(source.client_code(), ClientCode::SchemaViolation);
    assert!(source.violations().iter().any(|v| v.field == "role"));
    assert!(source.violations().iter().any(|v| v.field == "feature"));
}

#[test]
fn invalid_plugin_options_are_fatal() {
    let err = boot("version: 1\nauthorization: { roles: [ADMIN], subsets: [x] }\n")
        .err()
        .expect("must fail");
    assert!(matches!(err, StartupError::Plugin(_)));
    assert_eq!(err.core().violations()[0].field, "subsets");
}

#[test]
fn head_resolves_to_get_entry() {
    let state = boot(
        r#"
version: 1
server: { default_auth: bearer }
routes:
  - { method: GET, path: /admin, authorization: { role: ADMIN, validateFeature: false } }
"#,
    )
    .unwrap();
    assert!(matches!(
        state.routes().lookup(&Method::HEAD, "/admin"),
        Some(RouteAuthz::Enforce(_))
    ));
    assert!(state.routes().lookup(&Method::POST, "/admin").is_none());
}

#[test]
fn example_config_boots() {
    let state = boot(include_str!("../rolegate.example.yaml")).unwrap();
    assert_eq!(state.routes().len(), 5);
    assert_eq!(state.credentials().len(), 2);
}

#[test]
fn route_on_ops_path_is_fatal() {
    let err = boot(
        r#"
version: 1
routes:
  - { method: GET, path: /ok }
  - { method: POST, path: /healthz }
"#,
    )
    .err()
    .expect("must fail");

    let (route, source) = route_error(err);
    assert_eq!(route, "POST /healthz");
    assert_eq!(source.client_code(), ClientCode::BadRequest);
}

#[test]
fn catch_all_shadowing_ops_path_is_fatal() {
    let err = boot("version: 1\nroutes:\n  - { method: GET, path: \"/*rest\" }\n")
        .err()
        .expect("must fail");
    let (route, source) = route_error(err);
    assert_eq!(route, "GET /*rest");
    assert!(source.to_string().contains("/healthz"), "{source}");
}

#[test]
fn conflicting_param_names_are_fatal_and_named() {
    let err = boot(
        r#"
version: 1
routes:
  - { method: GET, path: "/a/:id" }
  - { method: POST, path: "/a/:name" }
"#,
    )
    .err()
    .expect("must fail");

    let msg = err.to_string();
    assert!(msg.starts_with("route POST /a/:name:"), "{msg}");
    assert!(msg.contains("/a/:id"), "{msg}");
}

#[test]
fn malformed_template_is_fatal() {
    for path in ["/a/:", "/files/*rest/meta", "/a/x:id"] {
        let yaml = format!("version: 1\nroutes:\n  - {{ method: GET, path: \"{path}\" }}\n");
        let err = boot(&yaml).err().expect("must fail");
        let (route, source) = route_error(err);
        assert_eq!(route, format!("GET {path}"));
        assert_eq!(source.client_code(), ClientCode::BadRequest);
    }
}

#[test]
fn same_template_under_two_methods_and_static_overlap_mount() {
    let state = boot(
        r#"
version: 1
routes:
  - { method: GET, path: "/billing/:id" }
  - { method: DELETE, path: "/billing/:id" }
  - { method: POST, path: /billing/export }
"#,
    )
    .unwrap();
    assert_eq!(state.routes().paths().len(), 2);
    let _ = router::build_router(state);
}
