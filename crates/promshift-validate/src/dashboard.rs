use serde_json::Value;

use promshift_core::Verdict;

/// Structural validation of a Grafana dashboard object. Pure and in-process:
/// no subprocess, no I/O, deterministic for a given input.
///
/// Required fields and panel/target shape are blocking — without them the
/// dashboard is not mechanically importable. Recommended fields (uid,
/// schemaVersion, time, refresh) and query-sanity findings only warn, so an
/// otherwise-usable dashboard never fails on quality advice.
pub fn validate(dashboard: &Value) -> Verdict {
    let mut errors = Vec::new();

    // Required top-level fields, presence and type. Any violation here stops
    // before panel checks — there is nothing meaningful to walk.
    check_field(dashboard, "title", Value::is_string, "string", &mut errors);
    check_field(dashboard, "panels", Value::is_array, "list", &mut errors);
    if !errors.is_empty() {
        return Verdict::fail(format!(
            "Dashboard schema validation: FAILED\n\n{}",
            bullets(&errors)
        ));
    }

    let mut log = vec!["Required fields: PASSED".to_string()];

    let empty = Vec::new();
    let panels = dashboard
        .get("panels")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    if panels.is_empty() {
        errors.push("Dashboard has no panels".to_string());
    }

    for (i, panel) in panels.iter().enumerate() {
        for field in ["id", "type", "title"] {
            if panel.get(field).is_none() {
                errors.push(format!("Panel {i}: missing '{field}'"));
            }
        }
        match panel.get("gridPos") {
            Some(grid) => {
                for field in ["x", "y", "w", "h"] {
                    if grid.get(field).is_none() {
                        errors.push(format!("Panel {i}: gridPos missing '{field}'"));
                    }
                }
            }
            None => errors.push(format!("Panel {i}: missing 'gridPos'")),
        }
        if let Some(targets) = panel.get("targets") {
            match targets.as_array() {
                None => errors.push(format!("Panel {i}: 'targets' should be a list")),
                Some(list) if list.is_empty() => {
                    errors.push(format!("Panel {i}: no targets (queries) defined"))
                }
                Some(list) => {
                    for (j, target) in list.iter().enumerate() {
                        if target.get("expr").is_none() && target.get("query").is_none() {
                            errors.push(format!("Panel {i}, target {j}: missing 'expr' or 'query'"));
                        }
                        if target.get("refId").is_none() {
                            errors.push(format!("Panel {i}, target {j}: missing 'refId'"));
                        }
                    }
                }
            }
        }
    }

    // One combined verdict so the generator sees every problem in one
    // round-trip instead of fixing them one at a time.
    if !errors.is_empty() {
        return Verdict::fail(format!("Panel validation: FAILED\n\n{}", bullets(&errors)));
    }
    log.push(format!("Panel validation: PASSED ({} panels)", panels.len()));

    // Advisory from here on — never flips the verdict.
    let mut warnings = Vec::new();
    for (field, hint) in [
        ("uid", "Recommended: add 'uid' for dashboard identification"),
        ("schemaVersion", "Recommended: add 'schemaVersion'"),
        ("time", "Recommended: add 'time' object for default time range"),
        ("refresh", "Recommended: add 'refresh' for auto-refresh interval"),
    ] {
        if dashboard.get(field).is_none() {
            warnings.push(hint.to_string());
        }
    }
    if !warnings.is_empty() {
        log.push("\nRecommendations:".to_string());
        log.push(bullets(&warnings));
    }

    let mut query_issues = Vec::new();
    for (i, panel) in panels.iter().enumerate() {
        let targets = panel.get("targets").and_then(Value::as_array).unwrap_or(&empty);
        for (j, target) in targets.iter().enumerate() {
            if let Some(expr) = target.get("expr").and_then(Value::as_str) {
                if expr.contains("{}") || expr.contains("[]") {
                    query_issues.push(format!(
                        "Panel {i}, target {j}: query contains empty braces/brackets"
                    ));
                }
                if expr.trim().is_empty() {
                    query_issues.push(format!("Panel {i}, target {j}: empty query"));
                }
            }
        }
    }
    if !query_issues.is_empty() {
        log.push("\nQuery issues:".to_string());
        log.push(bullets(&query_issues));
    }

    Verdict::pass(log.join("\n"))
}

fn check_field(
    dashboard: &Value,
    field: &str,
    is_expected: fn(&Value) -> bool,
    expected: &str,
    errors: &mut Vec<String>,
) {
    match dashboard.get(field) {
        None => errors.push(format!("Missing required field: '{field}'")),
        Some(v) if !is_expected(v) => errors.push(format!(
            "Field '{field}' should be a {expected}, got {}",
            type_name(v)
        )),
        Some(_) => {}
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}
