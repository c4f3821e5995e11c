#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use super::LoadingPhrases;
use super::SessionStore;
use crate::domain::models::AnswerServiceRef;
use crate::domain::models::AskResponse;
use crate::domain::models::Event;
use crate::domain::models::Exchange;
use crate::domain::models::ExchangeOutcome;
use crate::domain::models::ExchangeState;
use crate::domain::models::Message;
use crate::domain::models::Session;
use crate::domain::models::DEFAULT_SESSION_TITLE;

pub const FAILED_EXCHANGE_TEXT: &str =
    "⚠️ Something went wrong while contacting the server. Please try again.";
pub const MISSING_ANSWER_TEXT: &str = "No answer received.";

/// Drives one question and answer round trip at a time against the answer
/// service, keeping the session store up to date on both ends of it.
pub struct Conversation {
    store: Arc<SessionStore>,
    service: AnswerServiceRef,
    state: ExchangeState,
    input: String,
    in_flight: Option<Exchange>,
    revision: u64,
    started_at: HashMap<String, u64>,
    loading_tx: Option<(mpsc::UnboundedSender<Event>, Duration)>,
    loading: Option<LoadingPhrases>,
}

impl Conversation {
    pub fn new(store: Arc<SessionStore>, service: AnswerServiceRef) -> Conversation {
        return Conversation {
            store,
            service,
            state: ExchangeState::Idle,
            input: "".to_string(),
            in_flight: None,
            revision: 0,
            started_at: HashMap::new(),
            loading_tx: None,
            loading: None,
        };
    }

    /// Emit rotating `Event::LoadingPhrase`s while an exchange is in flight.
    pub fn with_loading_phrases(
        mut self,
        tx: mpsc::UnboundedSender<Event>,
        interval: Duration,
    ) -> Conversation {
        self.loading_tx = Some((tx, interval));
        return self;
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        return &self.store;
    }

    pub fn service(&self) -> AnswerServiceRef {
        return self.service.clone();
    }

    pub fn state(&self) -> ExchangeState {
        return self.state;
    }

    pub fn is_sending(&self) -> bool {
        return self.state == ExchangeState::Sending;
    }

    pub fn input(&self) -> &str {
        return &self.input;
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Marker to take before fetching history. Passing it back to
    /// `apply_history` discards the fetch if an exchange started on the same
    /// session in the meantime.
    pub fn revision(&self) -> u64 {
        return self.revision;
    }

    /// Starts an exchange for the pending input. Returns `None` when there is
    /// nothing to send or an exchange is already in flight.
    ///
    /// The user's message is appended to the current session, creating one if
    /// nothing is selected, before the exchange is handed back for dispatch.
    pub fn begin(&mut self) -> Result<Option<Exchange>> {
        if self.is_sending() {
            tracing::debug!("ignoring send while an exchange is in flight");
            return Ok(None);
        }
        if self.input.trim().is_empty() {
            return Ok(None);
        }

        let session_id = match self.store.current_id() {
            Some(id) => id,
            None => self.store.create_session(DEFAULT_SESSION_TITLE)?,
        };

        let exchange = Exchange {
            session_id,
            query: self.input.to_string(),
        };
        self.store
            .append_message(&exchange.session_id, Message::human(&exchange.query))?;

        self.revision += 1;
        self.started_at
            .insert(exchange.session_id.to_string(), self.revision);
        self.state = ExchangeState::Sending;
        self.in_flight = Some(exchange.clone());
        if let Some((tx, interval)) = &self.loading_tx {
            self.loading = Some(LoadingPhrases::start(tx.clone(), *interval));
        }
        tracing::debug!(session_id = %exchange.session_id, "exchange started");

        return Ok(Some(exchange));
    }

    fn reconcile(&self, exchange: &Exchange, result: Result<AskResponse>) -> Result<ExchangeOutcome> {
        let session_id = &exchange.session_id;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = ?err, session_id = %session_id, "exchange failed");
                self.store
                    .append_message(session_id, Message::ai(FAILED_EXCHANGE_TEXT))?;
                return Ok(ExchangeOutcome::Failed);
            }
        };

        let outcome = if let Some(history) = response.authoritative_history() {
            self.store.replace_messages(session_id, history.to_vec())?;
            ExchangeOutcome::Replaced
        } else {
            let answer = response
                .answer
                .unwrap_or_else(|| return MISSING_ANSWER_TEXT.to_string());
            self.store.append_message(session_id, Message::ai(&answer))?;
            ExchangeOutcome::Answered
        };

        self.store
            .rename_if_default(session_id, &Session::title_from_query(&exchange.query))?;

        return Ok(outcome);
    }

    /// Applies the service's result for an exchange started with `begin`.
    /// Whatever happens, the input is cleared and the controller is idle
    /// again afterwards.
    pub fn complete(
        &mut self,
        exchange: Exchange,
        result: Result<AskResponse>,
    ) -> Result<ExchangeOutcome> {
        if self.in_flight.as_ref() != Some(&exchange) {
            tracing::warn!(session_id = %exchange.session_id, "completing an exchange that isn't in flight");
        }

        let outcome = self.reconcile(&exchange, result);

        self.input.clear();
        if let Some(mut loading) = self.loading.take() {
            loading.stop();
        }
        self.in_flight = None;
        self.state = ExchangeState::Idle;
        tracing::debug!(session_id = %exchange.session_id, outcome = ?outcome, "exchange finished");

        return outcome;
    }

    /// Sends the pending input and waits for the answer.
    pub async fn send(&mut self) -> Result<Option<ExchangeOutcome>> {
        let exchange = match self.begin()? {
            Some(exchange) => exchange,
            None => return Ok(None),
        };

        let result = self
            .service
            .ask(&exchange.query, &exchange.session_id)
            .await;

        return Ok(Some(self.complete(exchange, result)?));
    }

    /// Replaces a session's messages with fetched server history. Skipped
    /// when the fetch failed or came back empty, when the session is gone, or
    /// while an exchange for it is in flight or started after `since`.
    pub fn apply_history(
        &self,
        session_id: &str,
        since: u64,
        result: Result<Vec<Message>>,
    ) -> Result<bool> {
        let history = match result {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(error = ?err, session_id = session_id, "history refresh failed");
                return Ok(false);
            }
        };

        if history.is_empty() {
            return Ok(false);
        }
        if let Some(exchange) = &self.in_flight {
            if exchange.session_id == session_id {
                return Ok(false);
            }
        }
        if let Some(started) = self.started_at.get(session_id) {
            if *started > since {
                tracing::debug!(session_id = session_id, "discarding history fetched before the last exchange");
                return Ok(false);
            }
        }

        match self.store.session(session_id) {
            Some(session) if session.messages != history => {
                self.store.replace_messages(session_id, history)?;
                return Ok(true);
            }
            _ => return Ok(false),
        }
    }

    /// Opportunistic refresh of a session from the server.
    pub async fn hydrate(&self, session_id: &str) -> Result<bool> {
        let since = self.revision;
        let result = self.service.history(session_id).await;
        return self.apply_history(session_id, since, result);
    }
}
