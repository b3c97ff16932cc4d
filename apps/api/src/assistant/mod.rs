//! Assistant Store: per-problem chat transcripts with a canned assistant.

pub mod handlers;
pub mod replies;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::chat::{ChatMessage, ChatRole};
use replies::{ReplyEngine, FALLBACK_REPLY};

#[derive(Clone)]
pub struct AssistantStore {
    transcripts: Arc<RwLock<HashMap<String, Vec<ChatMessage>>>>,
    engine: Arc<dyn ReplyEngine>,
    reply_delay: Duration,
}

impl AssistantStore {
    pub fn new(engine: Arc<dyn ReplyEngine>, reply_delay: Duration) -> Self {
        Self {
            transcripts: Arc::new(RwLock::new(HashMap::new())),
            engine,
            reply_delay,
        }
    }

    pub async fn transcript(&self, problem_id: &str) -> Vec<ChatMessage> {
        self.transcripts
            .read()
            .await
            .get(problem_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn append(&self, problem_id: &str, message: ChatMessage) {
        self.transcripts
            .write()
            .await
            .entry(problem_id.to_string())
            .or_default()
            .push(message);
    }

    /// Appends the user's message at once, then the assistant's reply after the
    /// simulated delay. Blank input is ignored and yields `None`.
    ///
    /// Engine failures are soft: the fallback apology is appended instead.
    pub async fn send_message(&self, problem_id: &str, content: &str) -> Option<ChatMessage> {
        if content.trim().is_empty() {
            return None;
        }

        self.append(problem_id, ChatMessage::new(ChatRole::User, content))
            .await;

        tokio::time::sleep(self.reply_delay).await;

        let text = match self.engine.reply(problem_id, content).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Assistant reply failed for problem {problem_id}: {e}");
                FALLBACK_REPLY.to_string()
            }
        };

        let reply = ChatMessage::new(ChatRole::Assistant, text);
        self.append(problem_id, reply.clone()).await;
        debug!("Assistant replied on problem {problem_id}");
        Some(reply)
    }

    pub async fn clear_chat_history(&self, problem_id: &str) {
        self.transcripts
            .write()
            .await
            .insert(problem_id.to_string(), Vec::new());
        debug!("Cleared chat history for problem {problem_id}");
    }
}
