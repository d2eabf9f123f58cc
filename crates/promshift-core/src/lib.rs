pub mod rulefmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// --- Conversation state ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Ordered role-tagged messages for one translation run. Grows monotonically
/// across retry attempts and is discarded when the run ends.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: Role::System,
                content: system.into(),
            }],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// The system instructions, if the conversation carries any.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Non-system turns, in order.
    pub fn turns(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// --- Validation verdicts ---

/// Outcome of one validator invocation: pass/fail plus a diagnostic log.
/// Produced fresh per attempt and never merged across attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub log: String,
    /// The failure cannot be fixed by regenerating (e.g. the checker binary
    /// is missing). The orchestrator stops retrying instead of burning the
    /// remaining attempt budget.
    #[serde(default)]
    pub fatal: bool,
}

impl Verdict {
    pub fn pass(log: impl Into<String>) -> Self {
        Self {
            passed: true,
            log: log.into(),
            fatal: false,
        }
    }

    pub fn fail(log: impl Into<String>) -> Self {
        Self {
            passed: false,
            log: log.into(),
            fatal: false,
        }
    }

    pub fn fatal(log: impl Into<String>) -> Self {
        Self {
            passed: false,
            log: log.into(),
            fatal: true,
        }
    }
}

// --- Candidate artifacts ---

/// Parsed generator output for one query-translation attempt. Field names
/// match the JSON contract the prompt template imposes on the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleArtifact {
    pub reasoning: String,
    pub rule_yaml: String,
    pub test_yaml: String,
}

/// Parsed generator output for one dashboard-translation attempt. The
/// dashboard stays a raw JSON value so the validator can report every
/// structural violation instead of failing on the first mistyped field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardArtifact {
    #[serde(default = "default_reasoning")]
    pub reasoning: String,
    #[serde(rename = "grafana_dashboard")]
    pub dashboard: serde_json::Value,
}

fn default_reasoning() -> String {
    "N/A".to_string()
}

/// Result of one translation run. All failure kinds are absorbed here;
/// nothing escapes the public operations as an unhandled fault. A rejected
/// run still carries the last candidate so the caller can inspect it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub success: bool,
    pub artifact: Option<T>,
    pub log: String,
}

impl<T> Outcome<T> {
    pub fn accepted(artifact: T, log: impl Into<String>) -> Self {
        Self {
            success: true,
            artifact: Some(artifact),
            log: log.into(),
        }
    }

    pub fn rejected(artifact: Option<T>, log: impl Into<String>) -> Self {
        Self {
            success: false,
            artifact,
            log: log.into(),
        }
    }
}

// --- Capability traits ---

/// Generator adapter failure. Neither variant is fed back to the generator
/// as corrective context — there is no structural diagnostic to act on.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("generation timed out: {0}")]
    Timeout(String),
}

/// Black-box text-completion provider: conversation in, one completion out.
/// Abstracted so the orchestrator can be tested with a scripted stub.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn complete(&self, conversation: &Conversation) -> Result<String, GenerateError>;
}

/// Rule checker: rule and test YAML in, verdict out. Abstracted so tests can
/// substitute an in-process fake instead of depending on the real binary.
#[async_trait]
pub trait CheckRules: Send + Sync {
    async fn check(&self, rule_yaml: &str, test_yaml: &str) -> Verdict;
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// Resolve the global config directory (~/.promshift/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promshift")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    let path = settings_path();
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<(), String> {
    let dir = config_dir();
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(settings_path(), json).map_err(|e| e.to_string())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_starts_with_system_turn() {
        let conv = Conversation::new("you are a translator");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.system(), Some("you are a translator"));
        assert_eq!(conv.turns().count(), 0);
    }

    #[test]
    fn conversation_grows_in_order() {
        let mut conv = Conversation::new("sys");
        conv.push_user("translate this");
        conv.push_assistant("{}");
        conv.push_user("fix it");
        let roles: Vec<Role> = conv.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn dashboard_artifact_reasoning_defaults() {
        let artifact: DashboardArtifact =
            serde_json::from_str(r#"{"grafana_dashboard": {"title": "T", "panels": []}}"#)
                .unwrap();
        assert_eq!(artifact.reasoning, "N/A");
    }

    #[test]
    fn rule_artifact_requires_all_fields() {
        let err = serde_json::from_str::<RuleArtifact>(r#"{"reasoning": "r"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn ollama_needs_no_api_key() {
        let settings = AiSettings {
            provider: "ollama".into(),
            api_key: String::new(),
            model: "llama3".into(),
        };
        assert!(ai_configured(&settings));
        let settings = AiSettings {
            provider: "openai".into(),
            api_key: String::new(),
            model: "gpt-4o".into(),
        };
        assert!(!ai_configured(&settings));
    }
}
