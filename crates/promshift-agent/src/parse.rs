use promshift_core::{DashboardArtifact, RuleArtifact};

/// Extract the outermost JSON object from raw completion text. Tolerates
/// markdown fences or prose around the object; the generator is told not to
/// emit them, but told is not guaranteed.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse a completion into a query-translation candidate. Missing required
/// fields reject the attempt before any validation is run.
pub fn rule_candidate(raw: &str) -> Result<RuleArtifact, String> {
    let json = extract_json_object(raw).ok_or_else(|| "no JSON object in completion".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Parse a completion into a dashboard-translation candidate. The dashboard
/// must itself be a JSON object; reasoning may be absent (defaults to "N/A").
pub fn dashboard_candidate(raw: &str) -> Result<DashboardArtifact, String> {
    let json = extract_json_object(raw).ok_or_else(|| "no JSON object in completion".to_string())?;
    let artifact: DashboardArtifact = serde_json::from_str(json).map_err(|e| e.to_string())?;
    if !artifact.dashboard.is_object() {
        return Err("'grafana_dashboard' is not a JSON object".to_string());
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_object() {
        let artifact = rule_candidate(
            r#"{"reasoning": "r", "rule_yaml": "groups: []", "test_yaml": "tests: []"}"#,
        )
        .unwrap();
        assert_eq!(artifact.reasoning, "r");
        assert_eq!(artifact.rule_yaml, "groups: []");
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"reasoning\": \"r\", \"rule_yaml\": \"a\", \"test_yaml\": \"b\"}\n```";
        assert!(rule_candidate(raw).is_ok());
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = rule_candidate(r#"{"reasoning": "r", "rule_yaml": "a"}"#).unwrap_err();
        assert!(err.contains("test_yaml"));
    }

    #[test]
    fn no_object_is_rejected() {
        assert!(rule_candidate("sorry, I cannot help with that").is_err());
    }

    #[test]
    fn dashboard_must_be_an_object() {
        let err =
            dashboard_candidate(r#"{"reasoning": "r", "grafana_dashboard": "oops"}"#).unwrap_err();
        assert!(err.contains("not a JSON object"));
    }

    #[test]
    fn dashboard_reasoning_defaults() {
        let artifact =
            dashboard_candidate(r#"{"grafana_dashboard": {"title": "T", "panels": []}}"#).unwrap();
        assert_eq!(artifact.reasoning, "N/A");
    }
}
