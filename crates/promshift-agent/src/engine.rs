use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use promshift_core::{AiSettings, Conversation, Generate, GenerateError, Role};

/// Fixed sampling temperature: translations should be reproducible-ish, not
/// creative.
const TEMPERATURE: f32 = 0.3;

fn map_backend(provider: &str) -> Result<LLMBackend, String> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}

/// Generator adapter backed by the `llm` crate. Maps the conversation's
/// system turn to the builder and the remaining turns to chat messages.
pub struct LlmGenerator {
    settings: AiSettings,
}

impl LlmGenerator {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Generate for LlmGenerator {
    async fn complete(&self, conversation: &Conversation) -> Result<String, GenerateError> {
        let backend = map_backend(&self.settings.provider).map_err(GenerateError::Provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .temperature(TEMPERATURE);

        if let Some(system) = conversation.system() {
            builder = builder.system(system);
        }
        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }

        let llm = builder
            .build()
            .map_err(|e| GenerateError::Provider(format!("build LLM: {e}")))?;

        let messages: Vec<ChatMessage> = conversation
            .turns()
            .map(|m| match m.role {
                Role::Assistant => ChatMessage::assistant().content(m.content.as_str()).build(),
                _ => ChatMessage::user().content(m.content.as_str()).build(),
            })
            .collect();

        tracing::debug!(
            provider = %self.settings.provider,
            model = %self.settings.model,
            turns = messages.len(),
            "sending conversation to generator"
        );

        let response = llm.chat(&messages).await.map_err(|e| {
            let msg = e.to_string();
            if msg.to_lowercase().contains("timed out") || msg.to_lowercase().contains("timeout") {
                GenerateError::Timeout(msg)
            } else {
                GenerateError::Provider(format!("chat: {msg}"))
            }
        })?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(GenerateError::Provider("LLM returned empty text".to_string())),
            None => Err(GenerateError::Provider("LLM returned no text".to_string())),
        }
    }
}
