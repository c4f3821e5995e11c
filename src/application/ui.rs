use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AnswerService;
use crate::domain::models::AnswerServiceRef;
use crate::domain::models::Event;
use crate::domain::models::Exchange;
use crate::domain::models::Loading;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;
use crate::domain::models::DEFAULT_SESSION_TITLE;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Conversation;
use crate::domain::services::SessionStore;

const SIDEBAR_WIDTH: u16 = 32;

fn spawn_exchange(service: AnswerServiceRef, exchange: Exchange, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let result = service.ask(&exchange.query, &exchange.session_id).await;
        if tx.send(Event::ExchangeFinished(exchange, result)).is_err() {
            tracing::debug!("ui closed before the answer arrived");
        }
    });
}

fn spawn_history(
    conversation: &Conversation,
    session_id: String,
    tx: mpsc::UnboundedSender<Event>,
) {
    let service = conversation.service();
    let since = conversation.revision();
    tokio::spawn(async move {
        let result = service.history(&session_id).await;
        if tx
            .send(Event::HistoryLoaded(session_id, since, result))
            .is_err()
        {
            tracing::debug!("ui closed before history arrived");
        }
    });
}

fn spawn_health_check(service: AnswerServiceRef, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        if let Err(err) = service.health_check().await {
            if tx.send(Event::HealthCheckFailed(err.to_string())).is_err() {
                tracing::debug!("ui closed before the health check finished");
            }
        }
    });
}

fn render_sidebar<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let items = app_state
        .sidebar
        .iter()
        .map(|session| {
            return ListItem::new(session.title.to_string());
        })
        .collect::<Vec<ListItem>>();

    let mut list_state = ListState::default();
    list_state.select(app_state.selected_index());

    frame.render_stateful_widget(
        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Chats"),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("> "),
        rect,
        &mut list_state,
    );
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    events: &mut EventsService,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let mut textarea = TextArea::default();

    loop {
        terminal.draw(|frame| {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
                .split(frame.size());
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Min(1), Constraint::Max(4)])
                .split(columns[1]);

            let chat_rect = layout[0].inner(&Margin {
                vertical: 1,
                horizontal: 1,
            });
            if chat_rect.width != app_state.last_known_width
                || chat_rect.height != app_state.last_known_height
            {
                app_state.set_rect(chat_rect);
            }

            render_sidebar(frame, columns[0], app_state);

            let title = app_state
                .conversation
                .store()
                .current()
                .map(|session| return session.title)
                .unwrap_or_else(|| return DEFAULT_SESSION_TITLE.to_string());
            frame.render_widget(
                Paragraph::new(app_state.chat_view.lines().to_vec())
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_type(BorderType::Rounded)
                            .title(title),
                    )
                    .scroll((app_state.scroll.position, 0)),
                layout[0],
            );

            if app_state.conversation.is_sending() {
                Loading::new(&app_state.loading_phrase).render(frame, layout[1]);
            } else {
                frame.render_widget(textarea.widget(), layout[1]);
            }
        })?;

        match events.next().await? {
            Event::ExchangeFinished(exchange, result) => {
                app_state.finish(exchange, result)?;
                textarea = TextArea::default();
            }
            Event::HistoryLoaded(session_id, since, result) => {
                app_state
                    .conversation
                    .apply_history(&session_id, since, result)?;
            }
            Event::HealthCheckFailed(err) => {
                app_state.set_notice(&format!(
                    "Hey, it looks like the Careerist service at {} isn't reachable. Your questions will fail until it's back up.\n\nError: {err}",
                    Config::get(ConfigKey::ServiceURL)
                ));
            }
            Event::KeyboardCharInput(input) => {
                if !app_state.conversation.is_sending() {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !app_state.conversation.is_sending() {
                    for char in text.replace('\r', "").chars() {
                        let key = match char {
                            '\n' => Key::Enter,
                            _ => Key::Char(char),
                        };
                        textarea.input(Input {
                            key,
                            ctrl: false,
                            alt: false,
                        });
                    }
                }
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardCTRLN() => {
                app_state.new_chat()?;
            }
            Event::KeyboardEnter() => {
                if app_state.conversation.is_sending() {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }

                if let Some(command) = SlashCommand::parse(&input_str) {
                    textarea = TextArea::default();
                    if app_state.handle_slash_command(&command)? {
                        break;
                    }
                    continue;
                }

                if let Some(exchange) = app_state.submit(&input_str)? {
                    spawn_exchange(app_state.conversation.service(), exchange, tx.clone());
                }
            }
            Event::LoadingPhrase(phrase) => {
                if app_state.conversation.is_sending() {
                    app_state.loading_phrase = phrase;
                }
            }
            Event::SessionNext() => {
                if let Some(session_id) = app_state.select_relative(1) {
                    spawn_history(&app_state.conversation, session_id, tx.clone());
                }
            }
            Event::SessionPrevious() => {
                if let Some(session_id) = app_state.select_relative(-1) {
                    spawn_history(&app_state.conversation, session_id, tx.clone());
                }
            }
            Event::StoreChanged(store_event) => {
                app_state.handle_store_event(&store_event);
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => (),
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(store: Arc<SessionStore>, service: AnswerServiceRef) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let mut events = EventsService::new(rx, store.subscribe());

    let interval = Duration::from_millis(Config::get(ConfigKey::LoadingInterval).parse::<u64>()?);
    let conversation = Conversation::new(store.clone(), service.clone())
        .with_loading_phrases(tx.clone(), interval);
    let mut app_state = AppState::new(conversation);

    let session_id = Config::get(ConfigKey::SessionID);
    if !session_id.is_empty() {
        if store.session(&session_id).is_some() {
            store.select_session(&session_id);
            spawn_history(&app_state.conversation, session_id, tx.clone());
        } else {
            tracing::warn!(session_id = session_id, "requested session does not exist");
            app_state.set_notice(&format!(
                "Session {session_id} doesn't exist, so we're starting a new chat."
            ));
        }
    }
    spawn_health_check(service, tx.clone());

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, &mut events, tx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
