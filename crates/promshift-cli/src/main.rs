use std::env;
use std::fs;

use promshift_agent::{
    engine::LlmGenerator, Agent, Progress, DEFAULT_DASHBOARD_ATTEMPTS, DEFAULT_QUERY_ATTEMPTS,
};
use promshift_core::rulefmt;
use promshift_validate::Promtool;

/// Example legacy queries, for poking at the translator without digging up a
/// real Datadog export.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "CPU idle",
        "avg(last_2m):avg:system.cpu.idle{host:*} by {host} < 10",
    ),
    (
        "Memory usage",
        "avg(last_5m):avg:system.mem.used{*} by {host} / avg:system.mem.total{*} by {host} > 0.9",
    ),
    (
        "Error rate",
        "sum(last_5m):sum:http.errors{service:api}.as_rate() > 100",
    ),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let task = args.get(1).map(|s| s.as_str()).unwrap_or("");

    match task {
        "query" => {
            let legacy = args.get(2).unwrap_or_else(|| usage());
            let attempts = parse_attempts(args.get(3), DEFAULT_QUERY_ATTEMPTS);
            run_query(legacy, attempts).await;
        }
        "dashboard" => {
            let path = args.get(2).unwrap_or_else(|| usage());
            let attempts = parse_attempts(args.get(3), DEFAULT_DASHBOARD_ATTEMPTS);
            run_dashboard(path, attempts).await;
        }
        "examples" => {
            for (label, query) in EXAMPLES {
                println!("{label}:\n  {query}");
            }
        }
        "configure" => {
            let provider = args.get(2).unwrap_or_else(|| usage()).clone();
            let model = args.get(3).unwrap_or_else(|| usage()).clone();
            configure(provider, model, args.get(4).cloned());
        }
        _ => {
            usage();
        }
    }
}

fn usage() -> ! {
    eprintln!(
        "Usage:\n  \
promshift query <legacy-query> [max-attempts]\n  \
promshift dashboard <dashboard.json> [max-attempts]\n  \
promshift examples\n  \
promshift configure <provider> <model> [api-key]"
    );
    std::process::exit(1);
}

fn parse_attempts(arg: Option<&String>, default: u32) -> u32 {
    arg.and_then(|v| v.parse().ok()).unwrap_or(default).max(1)
}

fn settings() -> promshift_core::AiSettings {
    let mut settings = promshift_core::read_settings();
    if let Ok(key) = env::var("PROMSHIFT_API_KEY") {
        if !key.is_empty() {
            settings.api_key = key;
        }
    }
    if !promshift_core::ai_configured(&settings) {
        eprintln!(
            "No AI provider configured. Run `promshift configure <provider> <model> [api-key]` \
or set PROMSHIFT_API_KEY."
        );
        std::process::exit(1);
    }
    settings
}

fn configure(provider: String, model: String, api_key: Option<String>) {
    let mut settings = promshift_core::read_settings();
    settings.provider = provider;
    settings.model = model;
    // omitted key means "keep existing"
    if let Some(key) = api_key {
        settings.api_key = key;
    }
    match promshift_core::write_settings(&settings) {
        Ok(()) => println!(
            "Configured {} / {} (api key {}).",
            settings.provider,
            settings.model,
            if settings.api_key.is_empty() { "unset" } else { "set" }
        ),
        Err(e) => {
            eprintln!("Failed to write settings: {e}");
            std::process::exit(1);
        }
    }
}

struct ConsoleProgress {
    max_attempts: u32,
}

impl Progress for ConsoleProgress {
    fn on_attempt(&self, attempt: u32, reasoning: &str) {
        println!("Attempt {attempt}/{}", self.max_attempts);
        println!("  reasoning: {reasoning}");
    }

    fn on_validation(&self, passed: bool, log: &str) {
        if passed {
            println!("  validation: PASSED");
        } else {
            println!("  validation: FAILED");
            for line in log.lines() {
                println!("    {line}");
            }
        }
    }
}

async fn run_query(legacy: &str, attempts: u32) {
    let agent = Agent::new(LlmGenerator::new(settings()), Promtool::new());
    let progress = ConsoleProgress { max_attempts: attempts };

    let outcome = agent.translate_query(legacy, attempts, &progress).await;
    if !outcome.success {
        eprintln!("\nTranslation rejected after {attempts} attempt(s):\n{}", outcome.log);
        std::process::exit(1);
    }

    let Some(artifact) = outcome.artifact else {
        eprintln!("Translation reported success without an artifact");
        std::process::exit(1);
    };

    fs::write("rules.yml", &artifact.rule_yaml).expect("failed to write rules.yml");
    fs::write("tests.yml", &artifact.test_yaml).expect("failed to write tests.yml");
    println!("\nWrote rules.yml and tests.yml");

    if let Ok(rules) = rulefmt::parse_rule_file(&artifact.rule_yaml) {
        let rule_count: usize = rules.groups.iter().map(|g| g.rules.len()).sum();
        println!("  {} group(s), {} rule(s):", rules.groups.len(), rule_count);
        for group in &rules.groups {
            for rule in &group.rules {
                let kind = if rule.is_alert() { "alert" } else { "record" };
                println!("    {kind} {}", rule.name());
            }
        }
    }
    if let Ok(tests) = rulefmt::parse_test_file(&artifact.test_yaml) {
        let assertions: usize = tests.tests.iter().map(|t| t.alert_rule_test.len()).sum();
        println!("  {} test case(s), {} alert assertion(s)", tests.tests.len(), assertions);
    }
}

async fn run_dashboard(path: &str, attempts: u32) {
    let legacy = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {path}: {e}");
            std::process::exit(1);
        }
    };

    let agent = Agent::new(LlmGenerator::new(settings()), Promtool::new());
    let progress = ConsoleProgress { max_attempts: attempts };

    let outcome = agent.translate_dashboard(&legacy, attempts, &progress).await;
    if !outcome.success {
        eprintln!("\nTranslation rejected after {attempts} attempt(s):\n{}", outcome.log);
        std::process::exit(1);
    }

    let Some(artifact) = outcome.artifact else {
        eprintln!("Translation reported success without an artifact");
        std::process::exit(1);
    };

    let pretty = serde_json::to_string_pretty(&artifact.dashboard)
        .expect("accepted dashboard serializes");
    fs::write("dashboard.json", pretty).expect("failed to write dashboard.json");

    let panels = artifact
        .dashboard
        .get("panels")
        .and_then(|p| p.as_array())
        .map(|p| p.len())
        .unwrap_or(0);
    println!("\nWrote dashboard.json ({panels} panel(s)) — import it into Grafana");
}
