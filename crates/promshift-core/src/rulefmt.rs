//! Typed models for the Prometheus rule-file and unit-test wire formats.
//!
//! The orchestrator carries these artifacts as opaque YAML strings (the
//! external checker is the authority on their validity); this module exists
//! for callers that want to inspect an accepted artifact — counting groups,
//! listing rule names, summarizing test coverage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    pub groups: Vec<RuleGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    pub rules: Vec<Rule>,
}

/// One alerting or recording rule. Exactly one of `alert` / `record` is set
/// in a well-formed file; the checker enforces that, not this model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    pub expr: String,
    /// Duration gate: how long the condition must hold before the alert fires.
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Rule {
    pub fn name(&self) -> &str {
        self.alert
            .as_deref()
            .or(self.record.as_deref())
            .unwrap_or("")
    }

    pub fn is_alert(&self) -> bool {
        self.alert.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFile {
    #[serde(default)]
    pub rule_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_interval: Option<String>,
    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default)]
    pub input_series: Vec<InputSeries>,
    #[serde(default)]
    pub alert_rule_test: Vec<AlertRuleTest>,
}

/// A time-series fixture: label set plus literal value sequence
/// (e.g. series `demo_cpu_usage_percent{host="web-1"}`, values `90 90 90`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSeries {
    pub series: String,
    pub values: String,
}

/// An alert assertion tied to an evaluation-time offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleTest {
    pub eval_time: String,
    pub alertname: String,
    #[serde(default)]
    pub exp_alerts: Vec<ExpectedAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedAlert {
    #[serde(default)]
    pub exp_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exp_annotations: BTreeMap<String, String>,
}

pub fn parse_rule_file(yaml: &str) -> Result<RuleFile, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

pub fn parse_test_file(yaml: &str) -> Result<TestFile, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"groups:
  - name: cpu_alerts
    interval: 30s
    rules:
      - alert: HighCPUUsage
        expr: demo_cpu_usage_percent > 85
        for: 1m
        labels:
          severity: warning
        annotations:
          summary: "High CPU on {{ $labels.host }}"
      - record: cpu_usage_percent
        expr: avg_over_time(demo_cpu_usage_percent[5m])
"#;

    const TESTS: &str = r#"rule_files:
  - rules.yml
tests:
  - interval: 1m
    input_series:
      - series: 'demo_cpu_usage_percent{host="web-1"}'
        values: '90 90 90 90'
    alert_rule_test:
      - eval_time: 2m
        alertname: HighCPUUsage
        exp_alerts:
          - exp_labels:
              severity: warning
              host: web-1
"#;

    #[test]
    fn parses_grouped_rules() {
        let file = parse_rule_file(RULES).unwrap();
        assert_eq!(file.groups.len(), 1);
        let group = &file.groups[0];
        assert_eq!(group.name, "cpu_alerts");
        assert_eq!(group.interval.as_deref(), Some("30s"));
        assert_eq!(group.rules.len(), 2);

        let alert = &group.rules[0];
        assert!(alert.is_alert());
        assert_eq!(alert.name(), "HighCPUUsage");
        assert_eq!(alert.for_.as_deref(), Some("1m"));
        assert_eq!(alert.labels.get("severity").map(String::as_str), Some("warning"));

        let record = &group.rules[1];
        assert!(!record.is_alert());
        assert_eq!(record.name(), "cpu_usage_percent");
    }

    #[test]
    fn parses_test_suite() {
        let file = parse_test_file(TESTS).unwrap();
        assert_eq!(file.rule_files, vec!["rules.yml"]);
        assert_eq!(file.tests.len(), 1);
        let case = &file.tests[0];
        assert_eq!(case.input_series[0].values, "90 90 90 90");
        assert_eq!(case.alert_rule_test[0].eval_time, "2m");
        assert_eq!(case.alert_rule_test[0].alertname, "HighCPUUsage");
        assert_eq!(
            case.alert_rule_test[0].exp_alerts[0]
                .exp_labels
                .get("host")
                .map(String::as_str),
            Some("web-1")
        );
    }

    #[test]
    fn rejects_rule_file_without_groups() {
        assert!(parse_rule_file("rules: []").is_err());
    }

    #[test]
    fn round_trips_for_duration() {
        let file = parse_rule_file(RULES).unwrap();
        let out = serde_yaml::to_string(&file).unwrap();
        assert!(out.contains("for: 1m"));
        let again = parse_rule_file(&out).unwrap();
        assert_eq!(file, again);
    }
}
