use anyhow::Result;
use tui_textarea::Input;

use super::AskResponse;
use super::Exchange;
use super::Message;
use super::StoreEvent;

pub enum Event {
    ExchangeFinished(Exchange, Result<AskResponse>),
    HistoryLoaded(String, u64, Result<Vec<Message>>),
    HealthCheckFailed(String),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLN(),
    KeyboardEnter(),
    KeyboardPaste(String),
    LoadingPhrase(String),
    SessionNext(),
    SessionPrevious(),
    StoreChanged(StoreEvent),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
