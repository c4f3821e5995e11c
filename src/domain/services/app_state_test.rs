use std::sync::Arc;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use ratatui::prelude::Rect;

use super::AppState;
use super::HELP_TEXT;
use crate::domain::models::AnswerService;
use crate::domain::models::AskResponse;
use crate::domain::models::ExchangeOutcome;
use crate::domain::models::Message;
use crate::domain::models::SlashCommand;
use crate::domain::models::StoreEvent;
use crate::domain::models::DEFAULT_SESSION_TITLE;
use crate::domain::services::Conversation;
use crate::domain::services::SessionPersistence;
use crate::domain::services::SessionStore;
use crate::domain::services::FAILED_EXCHANGE_TEXT;
use crate::infrastructure::storage::memory::MemoryStore;

struct OfflineService {}

#[async_trait]
impl AnswerService for OfflineService {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        bail!("offline");
    }

    #[allow(clippy::implicit_return)]
    async fn ask(&self, _query: &str, _session_id: &str) -> Result<AskResponse> {
        bail!("offline");
    }

    #[allow(clippy::implicit_return)]
    async fn history(&self, _session_id: &str) -> Result<Vec<Message>> {
        bail!("offline");
    }

    #[allow(clippy::implicit_return)]
    async fn text_to_speech(&self, _text: &str, _lang: &str, _voice: &str) -> Result<Vec<u8>> {
        bail!("offline");
    }
}

fn new_app_state() -> AppState {
    let kv = Arc::new(MemoryStore::default());
    let store = Arc::new(SessionStore::new(SessionPersistence::new(kv)));
    let mut app_state = AppState::new(Conversation::new(store, Arc::new(OfflineService {})));
    app_state.set_rect(Rect::new(0, 0, 60, 10));

    return app_state;
}

/// Creates titled sessions, newest last in `titles`, so the sidebar lists
/// them in reverse.
fn with_sessions(app_state: &AppState, titles: &[&str]) -> Result<Vec<String>> {
    let store = app_state.conversation.store();
    let mut ids = vec![];
    for title in titles {
        let id = store.create_session(title)?;
        store.append_message(&id, Message::human(title))?;
        ids.push(id);
    }

    return Ok(ids);
}

#[test]
fn it_starts_empty() {
    let app_state = new_app_state();

    assert!(app_state.sidebar.is_empty());
    assert_eq!(app_state.chat_view.len(), 0);
    assert_eq!(app_state.selected_index(), None);
}

#[test]
fn it_submits_into_a_new_session() -> Result<()> {
    let mut app_state = new_app_state();

    let exchange = app_state.submit("How do I become a data analyst?")?;
    let exchange = exchange.ok_or_else(|| return anyhow!("expected an exchange"))?;

    assert!(app_state.conversation.is_sending());
    assert_eq!(app_state.sidebar.len(), 1);
    assert_eq!(app_state.selected_index(), Some(0));
    assert_eq!(
        app_state.current_messages(),
        vec![Message::human("How do I become a data analyst?")]
    );
    assert_eq!(
        Some(exchange.session_id),
        app_state.conversation.store().current_id()
    );
    return Ok(());
}

#[test]
fn it_ignores_submits_while_sending() -> Result<()> {
    let mut app_state = new_app_state();

    assert!(app_state.submit("First")?.is_some());
    assert!(app_state.submit("Second")?.is_none());
    assert_eq!(app_state.current_messages().len(), 1);
    return Ok(());
}

#[test]
fn it_finishes_with_an_answer() -> Result<()> {
    let mut app_state = new_app_state();
    let exchange = app_state
        .submit("How do I become a data analyst?")?
        .ok_or_else(|| return anyhow!("expected an exchange"))?;

    let outcome = app_state.finish(
        exchange,
        Ok(AskResponse {
            answer: Some("Learn SQL first.".to_string()),
            chat_history: None,
        }),
    )?;

    assert_eq!(outcome, ExchangeOutcome::Answered);
    assert!(!app_state.conversation.is_sending());
    assert_eq!(app_state.sidebar[0].title, "How do I become a data analyst?");
    assert_eq!(
        app_state.current_messages()[1],
        Message::ai("Learn SQL first.")
    );
    return Ok(());
}

#[test]
fn it_finishes_with_a_failure() -> Result<()> {
    let mut app_state = new_app_state();
    let exchange = app_state
        .submit("Hello")?
        .ok_or_else(|| return anyhow!("expected an exchange"))?;

    let outcome = app_state.finish(exchange, Err(anyhow!("connection refused")))?;

    assert_eq!(outcome, ExchangeOutcome::Failed);
    assert_eq!(app_state.conversation.input(), "");
    assert_eq!(app_state.sidebar[0].title, DEFAULT_SESSION_TITLE);
    assert_eq!(
        app_state.current_messages(),
        vec![Message::human("Hello"), Message::ai(FAILED_EXCHANGE_TEXT)]
    );
    return Ok(());
}

#[test]
fn it_switches_sessions() -> Result<()> {
    let mut app_state = new_app_state();
    let ids = with_sessions(&app_state, &["Oldest", "Middle", "Newest"])?;
    app_state.conversation.store().select_session(&ids[2]);

    assert_eq!(app_state.select_relative(1), Some(ids[1].to_string()));
    assert_eq!(app_state.select_relative(1), Some(ids[0].to_string()));
    assert_eq!(app_state.select_relative(1), None);
    assert_eq!(app_state.selected_index(), Some(2));

    assert_eq!(app_state.select_relative(-2), Some(ids[2].to_string()));
    assert_eq!(app_state.select_relative(-1), None);
    return Ok(());
}

#[test]
fn it_switches_to_the_first_session_from_a_draft() -> Result<()> {
    let mut app_state = new_app_state();
    let ids = with_sessions(&app_state, &["Older", "Newer"])?;
    app_state.new_chat()?;

    assert_eq!(app_state.selected_index(), None);
    assert_eq!(app_state.select_relative(1), Some(ids[1].to_string()));
    return Ok(());
}

#[test]
fn it_reuses_a_selected_draft() -> Result<()> {
    let mut app_state = new_app_state();
    app_state.new_chat()?;
    app_state.new_chat()?;

    assert_eq!(app_state.conversation.store().sessions().len(), 1);
    assert!(app_state.sidebar.is_empty());
    return Ok(());
}

#[test]
fn it_handles_quit() -> Result<()> {
    let mut app_state = new_app_state();
    let command = SlashCommand::parse("/quit").ok_or_else(|| return anyhow!("not a command"))?;

    assert!(app_state.handle_slash_command(&command)?);
    return Ok(());
}

#[test]
fn it_handles_help() -> Result<()> {
    let mut app_state = new_app_state();
    let command = SlashCommand::parse("/help").ok_or_else(|| return anyhow!("not a command"))?;

    assert!(!app_state.handle_slash_command(&command)?);
    assert_eq!(app_state.notice.as_deref(), Some(HELP_TEXT));
    assert!(app_state.chat_view.len() > 10);
    return Ok(());
}

#[test]
fn it_handles_delete() -> Result<()> {
    let mut app_state = new_app_state();
    let ids = with_sessions(&app_state, &["Older", "Newer"])?;
    let command = SlashCommand::parse("/delete").ok_or_else(|| return anyhow!("not a command"))?;

    app_state.handle_slash_command(&command)?;

    assert_eq!(app_state.sidebar.len(), 1);
    assert_eq!(
        app_state.conversation.store().current_id(),
        Some(ids[0].to_string())
    );
    return Ok(());
}

#[test]
fn it_notices_delete_without_selection() -> Result<()> {
    let mut app_state = new_app_state();
    let command = SlashCommand::parse("/d").ok_or_else(|| return anyhow!("not a command"))?;

    app_state.handle_slash_command(&command)?;

    assert!(app_state.notice.is_some());
    return Ok(());
}

#[test]
fn it_handles_clear() -> Result<()> {
    let mut app_state = new_app_state();
    with_sessions(&app_state, &["Older", "Newer"])?;
    let command = SlashCommand::parse("/clear").ok_or_else(|| return anyhow!("not a command"))?;

    app_state.handle_slash_command(&command)?;

    assert!(app_state.sidebar.is_empty());
    assert_eq!(app_state.conversation.store().current_id(), None);
    assert_eq!(app_state.chat_view.len(), 0);
    return Ok(());
}

#[test]
fn it_follows_store_events_to_the_bottom() -> Result<()> {
    let mut app_state = new_app_state();
    let ids = with_sessions(&app_state, &["Long"])?;
    let store = app_state.conversation.store().clone();
    for idx in 0..10 {
        store.append_message(&ids[0], Message::ai(&format!("Answer {idx}")))?;
    }

    app_state.handle_store_event(&StoreEvent::MessagesChanged(ids[0].to_string()));

    assert_eq!(app_state.chat_view.len(), 32);
    assert_eq!(app_state.scroll.position, 22);
    return Ok(());
}
