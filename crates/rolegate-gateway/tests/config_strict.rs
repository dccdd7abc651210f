#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rolegate_gateway::config::{self, AuthSetting};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
routes:
  - method: GET
    path: /admin
    authz: { role: ADMIN } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert!(cfg.server.default_auth.is_none());
    assert!(cfg.authorization.is_none());
    assert!(cfg.routes.is_empty());
}

#[test]
fn unsupported_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(err.to_string().contains("version"));
}

#[test]
fn auth_setting_forms() {
    let cfg = config::load_from_str(
        r#"
version: 1
routes:
  - { method: GET, path: /a }
  - { method: GET, path: /b, auth: false }
  - { method: GET, path: /c, auth: null }
  - { method: GET, path: /d, auth: bearer }
"#,
    )
    .unwrap();
    let auth: Vec<&AuthSetting> = cfg.routes.iter().map(|r| &r.auth).collect();
    assert_eq!(auth[0], &AuthSetting::Inherit);
    assert_eq!(auth[1], &AuthSetting::Disabled);
    assert_eq!(auth[2], &AuthSetting::Disabled);
    assert_eq!(auth[3], &AuthSetting::Strategy("bearer".into()));
}

#[test]
fn auth_true_rejected() {
    let bad = "version: 1\nroutes:\n  - { method: GET, path: /a, auth: true }\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn duplicate_routes_rejected() {
    let bad = r#"
version: 1
routes:
  - { method: GET, path: /a }
  - { method: get, path: /a }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("duplicate route"));
}

#[test]
fn bad_listen_and_path_rejected() {
    assert!(config::load_from_str("version: 1\nserver: { listen: nowhere }\n").is_err());
    assert!(config::load_from_str("version: 1\nroutes:\n  - { method: GET, path: a }\n").is_err());
}

#[test]
fn authorization_sections_stay_untyped() {
    // Schema checks belong to the core validator, not to YAML parsing.
    let cfg = config::load_from_str(
        r#"
version: 1
authorization: { roles: false, bogus: 1 }
routes:
  - { method: GET, path: /a, authorization: { role: ADMIN, roles: [ADMIN] } }
"#,
    )
    .expect("yaml layer accepts any shape");
    assert!(cfg.authorization.is_some());
    assert!(cfg.routes[0].authorization.is_some());
}

#[test]
fn example_config_parses() {
    let cfg = config::load_from_str(include_str!("../rolegate.example.yaml")).unwrap();
    assert_eq!(cfg.principals.len(), 2);
    assert_eq!(cfg.routes.len(), 5);
}
