//! Reply engines for the problem assistant.
//!
//! Default: `KeywordReplyEngine`, a deterministic rules table. A model-backed
//! engine can be swapped in through `AppState` without touching the store.

use async_trait::async_trait;

use crate::errors::AppError;

pub const HELP_REPLY: &str = "I can help you find NGO assistance. What specific help do you need?";
pub const CONTACT_REPLY: &str = "You can contact local NGOs through our platform. Would you like me to suggest some based on your problem?";
pub const THANKS_REPLY: &str =
    "You're welcome! I'm here to help connect you with the right resources.";
pub const DETAIL_REPLY: &str = "Thank you for sharing. I recommend describing your problem in detail so NGO helpers can understand how to assist you better. Do you need advice on any specific aspect?";
/// Appended in place of a reply when the engine fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

#[async_trait]
pub trait ReplyEngine: Send + Sync {
    async fn reply(&self, problem_id: &str, content: &str) -> Result<String, AppError>;
}

/// Keyword matcher, first hit wins:
/// "help" → offer help, "contact" → point at NGOs, "thank" → acknowledge,
/// anything else → ask for more detail. Case-insensitive substring match.
pub struct KeywordReplyEngine;

const RULES: &[(&str, &str)] = &[
    ("help", HELP_REPLY),
    ("contact", CONTACT_REPLY),
    ("thank", THANKS_REPLY),
];

pub fn select_reply(content: &str) -> &'static str {
    let lowered = content.to_lowercase();
    RULES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(DETAIL_REPLY)
}

#[async_trait]
impl ReplyEngine for KeywordReplyEngine {
    async fn reply(&self, _problem_id: &str, content: &str) -> Result<String, AppError> {
        Ok(select_reply(content).to_string())
    }
}
