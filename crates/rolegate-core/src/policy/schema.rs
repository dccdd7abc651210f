//! Closed-schema validation for route policies and plugin options.
//!
//! Payloads arrive as untyped JSON values (route metadata, YAML sections) and
//! are checked field by field. Every violated constraint is collected before
//! failing, so a single startup error lists all problems of one declaration.

use serde_json::{Map, Value};

use crate::error::{PolicyKind, Result, RoleGateError, Violation, Violations};

use super::model::{GlobalConfig, RoleRequirement, RoutePolicy, Whitelist};

const ROOT: &str = "<root>";

const ROUTE_FIELDS: [&str; 6] = ["role", "roles", "function", "feature", "subfeature", "validateFeature"];
const PLUGIN_FIELDS: [&str; 4] = ["roles", "functions", "features", "subfeatures"];

/// Output of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    Route(RoutePolicy),
    Plugin(GlobalConfig),
}

/// Validate `payload` against the schema selected by `kind`.
pub fn validate(kind: PolicyKind, payload: &Value) -> Result<Validated> {
    match kind {
        PolicyKind::Route => validate_route(payload).map(Validated::Route),
        PolicyKind::Plugin => validate_plugin(payload).map(Validated::Plugin),
    }
}

/// Validate a route's declaration slot.
///
/// Absent, `null` and `false` all mean "authorization disabled for this
/// route" and yield `None`. Anything else must be a valid policy object.
pub fn validate_route_declaration(decl: Option<&Value>) -> Result<Option<RoutePolicy>> {
    match decl {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(v) => validate_route(v).map(Some),
    }
}

pub fn validate_route(payload: &Value) -> Result<RoutePolicy> {
    let mut errs = Vec::new();
    let Some(obj) = as_object(payload, &mut errs) else {
        return fail(PolicyKind::Route, errs);
    };
    reject_unknown(obj, &ROUTE_FIELDS, &mut errs);

    let single = obj.get("role").and_then(|v| string_field("role", v, &mut errs));
    let multi = obj.get("roles").and_then(|v| role_list("roles", v, &mut errs));
    let function = obj.get("function").and_then(|v| string_field("function", v, &mut errs));
    let feature = obj.get("feature").and_then(|v| string_field("feature", v, &mut errs));
    let subfeature = obj.get("subfeature").and_then(|v| string_field("subfeature", v, &mut errs));

    let validate_feature = match obj.get("validateFeature") {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errs.push(Violation::new("validateFeature", "must be a boolean"));
            true
        }
    };

    // Presence is judged on keys so a mistyped field is not reported twice.
    if obj.contains_key("role") && obj.contains_key("roles") {
        errs.push(Violation::new("role", "conflict with forbidden peer \"roles\""));
    }
    if validate_feature && !obj.contains_key("feature") && !obj.contains_key("subfeature") {
        errs.push(Violation::new(
            "feature",
            "is required when \"validateFeature\" is true (or set \"subfeature\")",
        ));
    }

    if !errs.is_empty() {
        return fail(PolicyKind::Route, errs);
    }

    let role = match (single, multi) {
        (Some(r), _) => Some(RoleRequirement::One(r)),
        (None, Some(rs)) => Some(RoleRequirement::AnyOf(rs)),
        (None, None) => None,
    };

    Ok(RoutePolicy {
        role,
        function,
        feature,
        subfeature,
        validate_feature,
    })
}

/// Validate plugin options. `null` means "no options" and yields the defaults.
pub fn validate_plugin(payload: &Value) -> Result<GlobalConfig> {
    let mut cfg = GlobalConfig::default();
    if payload.is_null() {
        return Ok(cfg);
    }

    let mut errs = Vec::new();
    let Some(obj) = as_object(payload, &mut errs) else {
        return fail(PolicyKind::Plugin, errs);
    };
    reject_unknown(obj, &PLUGIN_FIELDS, &mut errs);

    match obj.get("roles") {
        None => {}
        Some(Value::Bool(false)) => cfg.roles = Whitelist::Disabled,
        Some(v @ Value::Array(_)) => {
            if let Some(ids) = identifier_list("roles", v, &mut errs) {
                cfg.roles = Whitelist::Only(ids);
            }
        }
        Some(_) => errs.push(Violation::new("roles", "must be an array or false")),
    }
    for (name, slot) in [
        ("functions", &mut cfg.functions),
        ("features", &mut cfg.features),
        ("subfeatures", &mut cfg.subfeatures),
    ] {
        if let Some(v) = obj.get(name) {
            if let Some(ids) = identifier_list(name, v, &mut errs) {
                *slot = Whitelist::Only(ids);
            }
        }
    }

    if !errs.is_empty() {
        return fail(PolicyKind::Plugin, errs);
    }
    Ok(cfg)
}

fn fail<T>(kind: PolicyKind, errs: Vec<Violation>) -> Result<T> {
    Err(RoleGateError::SchemaViolation {
        kind,
        violations: Violations(errs),
    })
}

fn as_object<'a>(payload: &'a Value, errs: &mut Vec<Violation>) -> Option<&'a Map<String, Value>> {
    let obj = payload.as_object();
    if obj.is_none() {
        errs.push(Violation::new(ROOT, "must be an object"));
    }
    obj
}

fn reject_unknown(obj: &Map<String, Value>, known: &[&str], errs: &mut Vec<Violation>) {
    for key in obj.keys() {
        if !known.contains(&key.as_str()) {
            errs.push(Violation::new(key.as_str(), "is not allowed"));
        }
    }
}

fn string_field(field: &str, v: &Value, errs: &mut Vec<Violation>) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) => {
            errs.push(Violation::new(field, "is not allowed to be empty"));
            None
        }
        _ => {
            errs.push(Violation::new(field, "must be a string"));
            None
        }
    }
}

/// Route `roles`: a non-empty list of non-empty strings.
fn role_list(field: &str, v: &Value, errs: &mut Vec<Violation>) -> Option<Vec<String>> {
    let ids = identifier_list(field, v, errs)?;
    if ids.is_empty() {
        errs.push(Violation::new(field, "must contain at least 1 item"));
        return None;
    }
    Some(ids)
}

fn identifier_list(field: &str, v: &Value, errs: &mut Vec<Violation>) -> Option<Vec<String>> {
    let Value::Array(items) = v else {
        errs.push(Violation::new(field, "must be an array"));
        return None;
    };
    let before = errs.len();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(s) = string_field(&format!("{field}[{i}]"), item, errs) {
            if !out.contains(&s) {
                out.push(s);
            }
        }
    }
    (errs.len() == before).then_some(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_roles_collapse() {
        let p = validate_route(&json!({ "roles": ["ADMIN", "ADMIN"], "validateFeature": false })).unwrap();
        assert_eq!(p.role(), Some(&RoleRequirement::AnyOf(vec!["ADMIN".into()])));
    }

    #[test]
    fn array_item_errors_name_the_index() {
        let err = validate_plugin(&json!({ "features": ["a", 7, ""] })).unwrap_err();
        assert!(err.violations().iter().any(|v| v.field == "features[1]"));
        assert!(err.violations().iter().any(|v| v.field == "features[2]"));
    }

    #[test]
    fn non_object_payload_is_root_violation() {
        let err = validate_route(&json!("ADMIN")).unwrap_err();
        assert_eq!(err.violations()[0].field, ROOT);
    }
}
