#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;

use super::ChatView;
use super::Conversation;
use super::Scroll;
use super::LOADING_PHRASES;
use crate::domain::models::AskResponse;
use crate::domain::models::Exchange;
use crate::domain::models::ExchangeOutcome;
use crate::domain::models::Message;
use crate::domain::models::Session;
use crate::domain::models::SlashCommand;
use crate::domain::models::StoreEvent;
use crate::domain::models::DEFAULT_SESSION_TITLE;

pub const HELP_TEXT: &str = "COMMANDS:
- /new (/n) - Start a new chat.
- /delete (/d) - Delete the current chat.
- /clear - Delete every chat.
- /help (/h) - Show this help.
- /quit /exit (/q) - Exit Careerist.

HOTKEYS:
- Up arrow / Down arrow / Page Up / Page Down - Scroll the chat.
- Alt+Up / Alt+Down (CTRL+P / CTRL+O) - Switch between chats.
- CTRL+N - Start a new chat.
- CTRL+C - Exit Careerist.";

pub struct AppState {
    pub conversation: Conversation,
    pub chat_view: ChatView,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub loading_phrase: String,
    pub notice: Option<String>,
    pub scroll: Scroll,
    pub sidebar: Vec<Session>,
}

impl AppState {
    pub fn new(conversation: Conversation) -> AppState {
        let mut app_state = AppState {
            conversation,
            chat_view: ChatView::default(),
            last_known_height: 0,
            last_known_width: 0,
            loading_phrase: LOADING_PHRASES[0].to_string(),
            notice: None,
            scroll: Scroll::default(),
            sidebar: vec![],
        };
        app_state.sync_dependants();

        return app_state;
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    /// Index of the current session in the sidebar, if it is listed there.
    pub fn selected_index(&self) -> Option<usize> {
        let current_id = self.conversation.store().current_id()?;
        return self.sidebar.iter().position(|session| {
            return session.id == current_id;
        });
    }

    pub fn current_messages(&self) -> Vec<Message> {
        return self
            .conversation
            .store()
            .current()
            .map(|session| return session.messages)
            .unwrap_or_default();
    }

    pub fn set_notice(&mut self, notice: &str) {
        self.notice = Some(notice.to_string());
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn handle_store_event(&mut self, event: &StoreEvent) {
        let current_id = self.conversation.store().current_id();
        let follows_current = match event {
            StoreEvent::Selected(_) | StoreEvent::Cleared => true,
            StoreEvent::Created(id)
            | StoreEvent::Deleted(id)
            | StoreEvent::MessagesChanged(id)
            | StoreEvent::Renamed(id) => current_id.as_deref() == Some(id.as_str()),
        };

        self.sync_dependants();
        if follows_current {
            self.scroll.last();
        }
    }

    /// Moves the selection `offset` steps through the listed sessions and
    /// returns the newly selected id, which is worth hydrating.
    pub fn select_relative(&mut self, offset: isize) -> Option<String> {
        let sessions = self.conversation.store().navigable();
        if sessions.is_empty() {
            return None;
        }

        let current_id = self.conversation.store().current_id();
        let next_idx = match sessions.iter().position(|session| {
            return Some(&session.id) == current_id.as_ref();
        }) {
            Some(idx) => {
                let last_idx = sessions.len() as isize - 1;
                (idx as isize + offset).clamp(0, last_idx) as usize
            }
            None => 0,
        };

        let next_id = sessions[next_idx].id.to_string();
        if Some(&next_id) == current_id.as_ref() {
            return None;
        }

        self.notice = None;
        self.conversation.store().select_session(&next_id);
        self.sync_dependants();
        self.scroll.last();

        return Some(next_id);
    }

    /// Starts a fresh chat. An untouched draft that is already selected is
    /// reused rather than stacking up another one.
    pub fn new_chat(&mut self) -> Result<()> {
        self.notice = None;
        if let Some(current) = self.conversation.store().current() {
            if current.is_draft() {
                self.sync_dependants();
                return Ok(());
            }
        }

        self.conversation
            .store()
            .create_session(DEFAULT_SESSION_TITLE)?;
        self.sync_dependants();

        return Ok(());
    }

    /// Returns true when the shell should exit.
    pub fn handle_slash_command(&mut self, command: &SlashCommand) -> Result<bool> {
        if command.is_quit() {
            return Ok(true);
        }

        if command.is_new() {
            self.new_chat()?;
        } else if command.is_delete() {
            match self.conversation.store().current_id() {
                Some(id) => {
                    self.notice = None;
                    self.conversation.store().delete_session(&id)?;
                }
                None => self.set_notice("There's no chat selected to delete."),
            }
        } else if command.is_clear() {
            self.notice = None;
            self.conversation.store().clear_all()?;
        } else if command.is_help() {
            self.set_notice(HELP_TEXT);
            return Ok(false);
        }

        self.sync_dependants();
        return Ok(false);
    }

    /// Hands the typed text to the conversation. The returned exchange still
    /// has to be dispatched to the answer service.
    pub fn submit(&mut self, text: &str) -> Result<Option<Exchange>> {
        self.conversation.set_input(text);
        let exchange = self.conversation.begin()?;
        if exchange.is_some() {
            self.notice = None;
            self.loading_phrase = LOADING_PHRASES[0].to_string();
            self.sync_dependants();
            self.scroll.last();
        }

        return Ok(exchange);
    }

    pub fn finish(
        &mut self,
        exchange: Exchange,
        result: Result<AskResponse>,
    ) -> Result<ExchangeOutcome> {
        let outcome = self.conversation.complete(exchange, result)?;
        self.loading_phrase = LOADING_PHRASES[0].to_string();
        self.sync_dependants();
        self.scroll.last();

        return Ok(outcome);
    }

    fn sync_dependants(&mut self) {
        self.sidebar = self.conversation.store().navigable();

        let messages = self.current_messages();
        self.chat_view.set_messages(
            &messages,
            self.notice.as_deref(),
            self.last_known_width as usize,
        );

        self.scroll
            .set_state(self.chat_view.len() as u16, self.last_known_height);

        if self.conversation.is_sending() {
            self.scroll.last();
        }
    }
}
