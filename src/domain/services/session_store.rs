#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::SessionPersistence;
use crate::domain::models::Message;
use crate::domain::models::Session;
use crate::domain::models::StoreEvent;

struct StoreState {
    sessions: Vec<Session>,
    current: Option<String>,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl StoreState {
    fn contains(&self, id: &str) -> bool {
        return self.sessions.iter().any(|session| return session.id == id);
    }

    fn notify(&mut self, events: Vec<StoreEvent>) {
        for event in events {
            self.subscribers
                .retain(|subscriber| return subscriber.send(event.clone()).is_ok());
        }
    }
}

/// The in memory source of truth for chat sessions. Sessions are ordered
/// most recent first. Every mutation is written through the persistence
/// layer before it becomes visible, so a failed write leaves the store as it
/// was.
pub struct SessionStore {
    persistence: SessionPersistence,
    state: Mutex<StoreState>,
}

impl SessionStore {
    pub fn new(persistence: SessionPersistence) -> SessionStore {
        let sessions = persistence.load();
        tracing::debug!(count = sessions.len(), "loaded sessions");

        return SessionStore {
            persistence,
            state: Mutex::new(StoreState {
                sessions,
                current: None,
                subscribers: vec![],
            }),
        };
    }

    /// Receives a `StoreEvent` after every change, once it has been persisted.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel::<StoreEvent>();
        self.state.lock().subscribers.push(tx);

        return rx;
    }

    pub fn sessions(&self) -> Vec<Session> {
        return self.state.lock().sessions.clone();
    }

    /// Sessions worth listing, which leaves out untouched drafts.
    pub fn navigable(&self) -> Vec<Session> {
        return self
            .state
            .lock()
            .sessions
            .iter()
            .filter(|session| return !session.is_draft())
            .cloned()
            .collect();
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        return self
            .state
            .lock()
            .sessions
            .iter()
            .find(|session| return session.id == id)
            .cloned();
    }

    pub fn current_id(&self) -> Option<String> {
        return self.state.lock().current.clone();
    }

    pub fn current(&self) -> Option<Session> {
        let state = self.state.lock();
        let current = state.current.as_ref()?;

        return state
            .sessions
            .iter()
            .find(|session| return &session.id == current)
            .cloned();
    }

    fn commit(
        &self,
        state: &mut StoreState,
        sessions: Vec<Session>,
        current: Option<String>,
        events: Vec<StoreEvent>,
    ) -> Result<()> {
        self.persistence.save(&sessions)?;
        state.sessions = sessions;
        state.current = current;
        state.notify(events);

        return Ok(());
    }

    /// Creates a session at the top of the list and makes it current.
    pub fn create_session(&self, initial_title: &str) -> Result<String> {
        let mut state = self.state.lock();

        let mut id = Session::create_id();
        while state.contains(&id) {
            id = Session::create_id();
        }

        let mut sessions = state.sessions.clone();
        sessions.insert(0, Session::new(&id, initial_title));

        self.commit(
            &mut state,
            sessions,
            Some(id.to_string()),
            vec![
                StoreEvent::Created(id.to_string()),
                StoreEvent::Selected(Some(id.to_string())),
            ],
        )?;
        tracing::debug!(id = %id, title = initial_title, "created session");

        return Ok(id);
    }

    pub fn select_session(&self, id: &str) {
        let mut state = self.state.lock();
        if !state.contains(id) {
            tracing::warn!(id = id, "Ignoring selection of unknown session");
            return;
        }
        if state.current.as_deref() == Some(id) {
            return;
        }

        state.current = Some(id.to_string());
        state.notify(vec![StoreEvent::Selected(Some(id.to_string()))]);
    }

    /// Removes a session. When it was current, the next session in the list
    /// becomes current.
    pub fn delete_session(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.contains(id) {
            tracing::warn!(id = id, "Ignoring delete of unknown session");
            return Ok(());
        }

        let sessions = state
            .sessions
            .iter()
            .filter(|session| return session.id != id)
            .cloned()
            .collect::<Vec<Session>>();

        let mut events = vec![StoreEvent::Deleted(id.to_string())];
        let mut current = state.current.clone();
        if current.as_deref() == Some(id) {
            current = sessions.first().map(|session| return session.id.to_string());
            events.push(StoreEvent::Selected(current.clone()));
        }

        return self.commit(&mut state, sessions, current, events);
    }

    /// Applies `update` to a copy of the session and commits it when the
    /// closure reports a change. Returns whether anything was committed.
    fn update_session<F>(&self, id: &str, event: StoreEvent, update: F) -> Result<bool>
    where
        F: FnOnce(&mut Session) -> bool,
    {
        let mut state = self.state.lock();
        let mut sessions = state.sessions.clone();

        let session = match sessions.iter_mut().find(|session| return session.id == id) {
            Some(session) => session,
            None => {
                tracing::warn!(id = id, "Ignoring update of unknown session");
                return Ok(false);
            }
        };

        if !update(session) {
            return Ok(false);
        }

        let current = state.current.clone();
        self.commit(&mut state, sessions, current, vec![event])?;

        return Ok(true);
    }

    pub fn append_message(&self, session_id: &str, message: Message) -> Result<()> {
        self.update_session(
            session_id,
            StoreEvent::MessagesChanged(session_id.to_string()),
            |session| {
                session.messages.push(message);
                return true;
            },
        )?;

        return Ok(());
    }

    /// Swaps the whole message log, used when the server hands back its
    /// authoritative history.
    pub fn replace_messages(&self, session_id: &str, messages: Vec<Message>) -> Result<()> {
        self.update_session(
            session_id,
            StoreEvent::MessagesChanged(session_id.to_string()),
            |session| {
                session.messages = messages;
                return true;
            },
        )?;

        return Ok(());
    }

    /// Renames only while the session still has the placeholder title, so a
    /// title that was already derived or chosen is never clobbered.
    pub fn rename_if_default(&self, session_id: &str, new_title: &str) -> Result<bool> {
        if new_title.trim().is_empty() {
            return Ok(false);
        }

        return self.update_session(
            session_id,
            StoreEvent::Renamed(session_id.to_string()),
            |session| {
                if !session.has_default_title() || session.title == new_title {
                    return false;
                }

                session.title = new_title.to_string();
                return true;
            },
        );
    }

    pub fn clear_all(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.commit(&mut state, vec![], None, vec![StoreEvent::Cleared])?;
        tracing::debug!("cleared all sessions");

        return Ok(());
    }
}
