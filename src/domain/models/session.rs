#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

use super::Message;

pub const DEFAULT_SESSION_TITLE: &str = "New Chat";
pub const SESSION_TITLE_MAX_CHARS: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new(id: &str, title: &str) -> Session {
        return Session {
            id: id.to_string(),
            title: title.to_string(),
            messages: vec![],
        };
    }

    /// Millisecond timestamp plus a short random suffix. Collisions are
    /// possible in theory, callers that need uniqueness must check.
    pub fn create_id() -> String {
        let suffix = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect::<String>();

        return format!("{}-{suffix}", Utc::now().timestamp_millis());
    }

    /// Derives a title from the first characters of a query.
    pub fn title_from_query(query: &str) -> String {
        return query
            .trim()
            .chars()
            .take(SESSION_TITLE_MAX_CHARS)
            .collect::<String>();
    }

    pub fn has_default_title(&self) -> bool {
        return self.title == DEFAULT_SESSION_TITLE;
    }

    /// Drafts are hidden from session listings until they gain a message or
    /// a real title.
    pub fn is_draft(&self) -> bool {
        return self.has_default_title() && self.messages.is_empty();
    }
}
