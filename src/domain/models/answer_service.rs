use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub chat_history: Option<Vec<Message>>,
}

impl AskResponse {
    /// Server history that should replace local state, if the response
    /// carries any.
    pub fn authoritative_history(&self) -> Option<&[Message]> {
        if let Some(history) = &self.chat_history {
            if !history.is_empty() {
                return Some(history);
            }
        }

        return None;
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub chat_history: Vec<Message>,
}

#[async_trait]
pub trait AnswerService {
    /// Used at startup to verify the service can be reached. Failures are
    /// shown to the user but never stop the app.
    async fn health_check(&self) -> Result<()>;

    /// Sends a query for a session. Non success statuses, transport errors
    /// and undecodable bodies are all errors.
    async fn ask(&self, query: &str, session_id: &str) -> Result<AskResponse>;

    /// Fetches the server side history for a session.
    async fn history(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Renders text to MP3 audio.
    async fn text_to_speech(&self, text: &str, lang: &str, voice: &str) -> Result<Vec<u8>>;
}

pub type AnswerServiceRef = Arc<dyn AnswerService + Send + Sync>;
