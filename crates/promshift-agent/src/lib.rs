pub mod engine;
mod parse;
mod prompt;

use promshift_core::{
    CheckRules, Conversation, DashboardArtifact, Generate, Outcome, RuleArtifact,
};
use promshift_validate::dashboard;

/// Default attempt budgets per artifact kind. Dashboards validate in-process
/// and converge faster, so they get a smaller default.
pub const DEFAULT_QUERY_ATTEMPTS: u32 = 3;
pub const DEFAULT_DASHBOARD_ATTEMPTS: u32 = 2;

/// Optional observer for per-attempt progress. Side effects only; nothing
/// here influences control flow. Headless callers pass `&()`.
pub trait Progress {
    fn on_attempt(&self, _attempt: u32, _reasoning: &str) {}
    fn on_validation(&self, _passed: bool, _log: &str) {}
}

impl Progress for () {}

/// The translation orchestrator: drafts a candidate via the generator,
/// validates it, and on a failing verdict feeds the diagnostic back into the
/// conversation before retrying, up to the caller's attempt budget.
///
/// Generic over its two collaborators so the retry logic is testable with a
/// scripted generator and an in-process fake checker.
pub struct Agent<G, C> {
    generator: G,
    checker: C,
}

impl<G: Generate, C: CheckRules> Agent<G, C> {
    pub fn new(generator: G, checker: C) -> Self {
        Self { generator, checker }
    }

    /// Translate a legacy Datadog query into Prometheus rules plus a promtool
    /// test suite. Never returns an error: every failure mode is absorbed
    /// into the outcome, and a rejected run still carries the last candidate.
    pub async fn translate_query(
        &self,
        legacy_query: &str,
        max_attempts: u32,
        progress: &dyn Progress,
    ) -> Outcome<RuleArtifact> {
        let max_attempts = max_attempts.max(1);
        let mut conversation = Conversation::new(prompt::QUERY_SYSTEM);
        conversation.push_user(prompt::query_request(legacy_query));

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, max_attempts, "drafting rule translation");

            let completion = match self.generator.complete(&conversation).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generator call failed");
                    if attempt == max_attempts {
                        return Outcome::rejected(None, e.to_string());
                    }
                    // No corrective feedback: there is nothing structural for
                    // the generator to act on. The attempt still counts.
                    continue;
                }
            };

            let candidate = match parse::rule_candidate(&completion) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "completion did not parse");
                    if attempt == max_attempts {
                        return Outcome::rejected(None, format!("response parsing failed: {e}"));
                    }
                    continue;
                }
            };

            progress.on_attempt(attempt, &candidate.reasoning);

            let verdict = self
                .checker
                .check(&candidate.rule_yaml, &candidate.test_yaml)
                .await;
            progress.on_validation(verdict.passed, &verdict.log);

            if verdict.passed {
                tracing::info!(attempt, "rule translation accepted");
                return Outcome::accepted(candidate, verdict.log);
            }
            if verdict.fatal || attempt == max_attempts {
                return Outcome::rejected(Some(candidate), verdict.log);
            }

            conversation.push_assistant(completion);
            conversation.push_user(prompt::rule_correction(&verdict.log));
        }

        Outcome::rejected(None, "attempt budget exhausted".to_string())
    }

    /// Translate a legacy Datadog dashboard (serialized JSON) into a Grafana
    /// dashboard, validated structurally in-process.
    pub async fn translate_dashboard(
        &self,
        legacy_dashboard: &str,
        max_attempts: u32,
        progress: &dyn Progress,
    ) -> Outcome<DashboardArtifact> {
        let max_attempts = max_attempts.max(1);
        let mut conversation = Conversation::new(prompt::DASHBOARD_SYSTEM);
        conversation.push_user(prompt::dashboard_request(legacy_dashboard));

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, max_attempts, "drafting dashboard translation");

            let completion = match self.generator.complete(&conversation).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generator call failed");
                    if attempt == max_attempts {
                        return Outcome::rejected(None, e.to_string());
                    }
                    continue;
                }
            };

            let candidate = match parse::dashboard_candidate(&completion) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "completion did not parse");
                    if attempt == max_attempts {
                        return Outcome::rejected(None, format!("response parsing failed: {e}"));
                    }
                    continue;
                }
            };

            progress.on_attempt(attempt, &candidate.reasoning);

            let verdict = dashboard::validate(&candidate.dashboard);
            progress.on_validation(verdict.passed, &verdict.log);

            if verdict.passed {
                tracing::info!(attempt, "dashboard translation accepted");
                return Outcome::accepted(candidate, verdict.log);
            }
            if verdict.fatal || attempt == max_attempts {
                return Outcome::rejected(Some(candidate), verdict.log);
            }

            conversation.push_assistant(completion);
            conversation.push_user(prompt::dashboard_correction(&verdict.log));
        }

        Outcome::rejected(None, "attempt budget exhausted".to_string())
    }
}
