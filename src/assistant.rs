//! Chat-style assistant panel
//!
//! Holds the conversation and drives one generation request per user message.
//! Only one request may be in flight at a time; a second `send` while the
//! first is pending is rejected rather than queued.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::generation::{GenerationError, GenerationRequest, TextGenerator};

/// Instructions sent with every prompt
pub const SYSTEM_INSTRUCTIONS: &str = "Você é um assistente especializado em desenvolvimento web, WordPress, e criação de sites.
Ajude o usuário com tarefas relacionadas a:
- Criação de conteúdo para sites
- Otimização SEO
- Sugestões de design
- Códigos HTML/CSS/JavaScript
- Configurações de plugins
- Estratégias de marketing digital

Seja conciso, prático e sempre ofereça soluções acionáveis.";

pub const GREETING: &str = "Olá! Sou seu assistente de IA. Como posso ajudar você hoje? Posso criar conteúdo, otimizar páginas, gerar códigos e muito mais!";

/// Canned prompts offered as one-click suggestions
pub const QUICK_PROMPTS: [&str; 4] = [
    "Crie uma página de contato",
    "Otimize meu site para SEO",
    "Gere conteúdo para blog",
    "Crie um formulário de newsletter",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A request is already in progress")]
    Busy,

    #[error("No quick prompt at index {0}")]
    UnknownQuickPrompt(usize),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Conversation state plus the generator that answers it
pub struct Assistant<G> {
    generator: G,
    system_instructions: String,
    messages: Mutex<Vec<ChatMessage>>,
    loading: AtomicBool,
}

impl<G: TextGenerator> Assistant<G> {
    /// Start a conversation with the default instructions and greeting.
    pub fn new(generator: G) -> Self {
        Self::with_instructions(generator, SYSTEM_INSTRUCTIONS)
    }

    pub fn with_instructions(generator: G, system_instructions: impl Into<String>) -> Self {
        Self {
            generator,
            system_instructions: system_instructions.into(),
            messages: Mutex::new(vec![ChatMessage::new(Role::Assistant, GREETING)]),
            loading: AtomicBool::new(false),
        }
    }

    /// Send a user message and wait for the reply.
    ///
    /// # Returns
    /// * `Ok(ChatMessage)` - the assistant reply, already appended
    /// * `Err(AssistantError::EmptyMessage)` - blank input, nothing appended
    /// * `Err(AssistantError::Busy)` - another request is pending, nothing appended
    /// * `Err(AssistantError::Generation)` - the user message stays, no reply appended
    pub async fn send(&self, text: &str) -> Result<ChatMessage, AssistantError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyMessage);
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AssistantError::Busy);
        }
        let _loading = LoadingGuard(&self.loading);

        self.messages.lock().push(ChatMessage::new(Role::User, text));

        let request = GenerationRequest::new(self.system_instructions.clone(), text);
        match self.generator.generate(&request).await {
            Ok(reply) => {
                let message = ChatMessage::new(Role::Assistant, reply);
                self.messages.lock().push(message.clone());
                info!(chars = message.content.len(), "assistant replied");
                Ok(message)
            }
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                Err(err.into())
            }
        }
    }

    /// Send one of the [`QUICK_PROMPTS`].
    pub async fn send_quick_prompt(&self, index: usize) -> Result<ChatMessage, AssistantError> {
        let prompt = QUICK_PROMPTS
            .get(index)
            .ok_or(AssistantError::UnknownQuickPrompt(index))?;
        self.send(prompt).await
    }

    /// Copy of the conversation so far
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

/// Clears the loading flag however `send` exits
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(format!("eco: {}", request.prompt))
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::Server(500))
        }
    }

    struct Sleepy;

    #[async_trait]
    impl TextGenerator for Sleepy {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok("zzz".into())
        }
    }

    #[test]
    fn test_starts_with_greeting() {
        let assistant = Assistant::new(Echo);
        let messages = assistant.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(messages[0].content, GREETING);
        assert!(!assistant.is_loading());
    }

    #[tokio::test]
    async fn test_send_appends_exchange() {
        let assistant = Assistant::new(Echo);
        let reply = assistant.send("  oi  ").await.unwrap();
        assert_eq!(reply.content, "eco: oi");

        let messages = assistant.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "oi");
        assert_eq!(messages[2], reply);
        assert!(!assistant.is_loading());
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let assistant = Assistant::new(Echo);
        assert!(matches!(
            assistant.send("   ").await,
            Err(AssistantError::EmptyMessage)
        ));
        assert_eq!(assistant.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_user_message_only() {
        let assistant = Assistant::new(Failing);
        let err = assistant.send("ajuda").await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Generation(GenerationError::Server(500))
        ));

        let messages = assistant.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::User);
        assert!(!assistant.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_send_is_busy() {
        let assistant = Arc::new(Assistant::new(Sleepy));

        let first = {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.send("primeiro").await })
        };
        // Let the first request take the loading flag
        while !assistant.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            assistant.send("segundo").await,
            Err(AssistantError::Busy)
        ));
        assert!(first.await.unwrap().is_ok());
        assert_eq!(assistant.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_quick_prompt() {
        let assistant = Assistant::new(Echo);
        let reply = assistant.send_quick_prompt(1).await.unwrap();
        assert_eq!(reply.content, "eco: Otimize meu site para SEO");
        assert!(matches!(
            assistant.send_quick_prompt(9).await,
            Err(AssistantError::UnknownQuickPrompt(9))
        ));
        assert_eq!(assistant.messages().len(), 3);
    }
}
