//! Static instruction documents for the two artifact kinds, plus the request
//! and correction message builders. The prompts define the output contract
//! the validators then check; they are consts and never mutated at runtime.

/// System instructions for query translation: Datadog monitor → Prometheus
/// alerting/recording rules with a paired promtool unit-test suite.
pub const QUERY_SYSTEM: &str = r#"You are an expert SRE migrating monitoring queries from Datadog to Prometheus.

CRITICAL RULES:
1. Naming standards:
   - Recording rules: snake_case (e.g. cpu_usage_percent)
   - Alert rules: PascalCase (e.g. HighCPUUsage)

2. Best practices:
   - Use avg_over_time(), rate(), or increase() to smooth noisy metrics
   - Set meaningful alert thresholds with context
   - Include a 'for' duration in alerts to prevent flapping
   - Add helpful annotations and descriptions

3. YAML formatting, VERY IMPORTANT:
   - Use actual newlines, not \n escape sequences
   - Use 2 spaces for indentation (never tabs)
   - Quote strings that contain special characters like {{ }} or :
   - The rule_yaml and test_yaml fields must be plain YAML strings, not escaped strings

4. Output format. You MUST return ONLY valid JSON with this exact structure:
{
    "reasoning": "Brief explanation of translation logic and any assumptions made",
    "rule_yaml": "groups:\n  - name: cpu_alerts\n    interval: 30s\n    rules:\n      - alert: HighCPUUsage\n        expr: demo_cpu_usage_percent > 85\n        for: 1m\n        labels:\n          severity: warning\n        annotations:\n          summary: \"High CPU on {{ $labels.host }}\"",
    "test_yaml": "rule_files:\n  - rules.yml\ntests:\n  - interval: 1m\n    input_series:\n      - series: 'demo_cpu_usage_percent{host=\"web-1\"}'\n        values: '90 90 90 90'\n    alert_rule_test:\n      - eval_time: 2m\n        alertname: HighCPUUsage\n        exp_alerts:\n          - exp_labels:\n              severity: warning\n              host: web-1"
}

5. Testing:
   - Include at least 2 test cases per rule
   - Test both firing conditions and edge cases
   - Use realistic metric values
   - Make sure eval_time is greater than the alert's 'for' duration

6. Use demo metrics:
   - Prefer demo_cpu_usage_percent{host="X"} for CPU
   - Use demo_memory_usage_percent{host="X"} for memory
   - Use demo_http_requests_total{service="X",status="Y"} for HTTP metrics

Remember: output ONLY the JSON object, no markdown formatting."#;

/// System instructions for dashboard translation: Datadog dashboard →
/// directly importable Grafana dashboard JSON.
pub const DASHBOARD_SYSTEM: &str = r#"You are an expert SRE migrating Datadog dashboards to Grafana.

CRITICAL RULES:
1. Queries: convert Datadog metrics to actual Prometheus node_exporter metrics or demo metrics
2. Use REAL metrics available in our demo:
   - node_cpu_seconds_total (for CPU)
   - node_memory_* (for memory)
   - demo_cpu_usage_percent{host="X"} (for demo CPU)
   - demo_memory_usage_percent{host="X"} (for demo memory)
   - demo_http_requests_total{service="X",status="Y"} (for HTTP metrics)
3. Panel types: use "timeseries" for graphs, "stat" for single values
4. Grid layout: use gridPos with x, y, w (width 0-24), h (height in units)

OUTPUT FORMAT. Return ONLY valid JSON with this EXACT structure:
{
    "reasoning": "Explanation of translation decisions and which metrics you used",
    "grafana_dashboard": {
        "title": "Dashboard Name",
        "uid": "migrated-dashboard",
        "timezone": "browser",
        "schemaVersion": 16,
        "version": 0,
        "refresh": "5s",
        "time": {
            "from": "now-15m",
            "to": "now"
        },
        "panels": [
            {
                "id": 1,
                "type": "timeseries",
                "title": "Panel Title",
                "gridPos": {"x": 0, "y": 0, "w": 12, "h": 8},
                "targets": [
                    {
                        "expr": "actual_prometheus_query",
                        "legendFormat": "{{instance}}",
                        "refId": "A"
                    }
                ],
                "options": {
                    "legend": {"displayMode": "list", "placement": "bottom"}
                },
                "fieldConfig": {
                    "defaults": {
                        "color": {"mode": "palette-classic"},
                        "custom": {
                            "axisPlacement": "auto",
                            "drawStyle": "line",
                            "fillOpacity": 10,
                            "lineWidth": 1,
                            "pointSize": 5,
                            "showPoints": "never"
                        },
                        "unit": "short"
                    }
                }
            }
        ]
    }
}

EXAMPLE VALID QUERIES:
- CPU: 100 - (avg by(instance) (irate(node_cpu_seconds_total{mode="idle"}[5m])) * 100)
- Memory: (1 - (node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes)) * 100
- Demo CPU: demo_cpu_usage_percent{host="web-1"}
- HTTP rate: rate(demo_http_requests_total[5m])

Remember: the dashboard object must be directly importable into Grafana. Output ONLY the JSON object."#;

pub fn query_request(legacy_query: &str) -> String {
    format!("Translate this monitoring query:\n{legacy_query}")
}

pub fn dashboard_request(legacy_dashboard: &str) -> String {
    format!("Translate this Datadog dashboard to Grafana:\n{legacy_dashboard}")
}

/// Follow-up turn after a failing rule verdict: the full diagnostic plus a
/// fixed remediation checklist.
pub fn rule_correction(log: &str) -> String {
    format!(
        "The previous output failed validation with these errors:\n\n{log}\n\n\
Fix the errors and generate valid YAML. Make sure:\n\
1. YAML is properly indented (use spaces, not tabs)\n\
2. Strings with special characters are quoted\n\
3. Test cases use valid time series format\n\
4. Alert expressions are valid PromQL\n\
5. eval_time in tests is greater than the alert's 'for' duration"
    )
}

/// Follow-up turn after a failing dashboard verdict.
pub fn dashboard_correction(log: &str) -> String {
    format!(
        "The dashboard failed schema validation with these errors:\n\n{log}\n\n\
Fix the errors and regenerate a valid Grafana dashboard. Make sure:\n\
1. All required fields are present (title, panels, etc.)\n\
2. Each panel has: id, type, title, gridPos, targets\n\
3. gridPos includes: x, y, w, h\n\
4. Each target has: expr (or query) and refId\n\
5. Panel IDs are unique integers\n\
6. Queries use valid PromQL syntax"
    )
}
