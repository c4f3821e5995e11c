#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use std::collections::HashSet;

use anyhow::Result;
use serde_json::Value;

use crate::domain::models::KeyValueStoreRef;
use crate::domain::models::Session;

pub const SESSIONS_STORAGE_KEY: &str = "chat_sessions";

fn has_session_shape(entry: &Value) -> bool {
    let is_string = |field: &str| {
        return entry.get(field).map(Value::is_string).unwrap_or(false);
    };
    let is_array = entry
        .get("messages")
        .map(Value::is_array)
        .unwrap_or(false);

    return is_string("id") && is_string("title") && is_array;
}

/// Returns `None` when the blob isn't a list of well formed sessions.
fn parse_sessions(value: Value) -> Option<Vec<Session>> {
    let entries = value.as_array()?;
    if !entries.iter().all(has_session_shape) {
        return None;
    }

    return serde_json::from_value::<Vec<Session>>(value).ok();
}

/// Mirrors the whole session collection into a key value store as a single
/// JSON blob.
pub struct SessionPersistence {
    store: KeyValueStoreRef,
}

impl SessionPersistence {
    pub fn new(store: KeyValueStoreRef) -> SessionPersistence {
        return SessionPersistence { store };
    }

    /// Never fails. Missing or unreadable state loads as an empty collection,
    /// and structurally invalid state is also deleted from the store.
    pub fn load(&self) -> Vec<Session> {
        let payload = match self.store.get(SESSIONS_STORAGE_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return vec![],
            Err(err) => {
                tracing::error!(error = ?err, "Failed to read stored sessions");
                return vec![];
            }
        };

        let value = match serde_json::from_str::<Value>(&payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = ?err, "Stored sessions are not valid JSON, ignoring them");
                return vec![];
            }
        };

        let sessions = match parse_sessions(value) {
            Some(sessions) => sessions,
            None => {
                tracing::warn!("Stored sessions are malformed, discarding them");
                if let Err(err) = self.store.remove(SESSIONS_STORAGE_KEY) {
                    tracing::error!(error = ?err, "Failed to discard malformed sessions");
                }
                return vec![];
            }
        };

        let mut seen = HashSet::new();
        return sessions
            .into_iter()
            .filter(|session| {
                if seen.insert(session.id.to_string()) {
                    return true;
                }

                tracing::warn!(id = %session.id, "Dropping stored session with duplicate id");
                return false;
            })
            .collect();
    }

    pub fn save(&self, sessions: &[Session]) -> Result<()> {
        let payload = serde_json::to_string(sessions)?;
        self.store.set(SESSIONS_STORAGE_KEY, &payload)?;

        return Ok(());
    }
}
