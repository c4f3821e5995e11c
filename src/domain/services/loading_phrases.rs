#[cfg(test)]
#[path = "loading_phrases_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::models::Event;

pub const LOADING_PHRASES: [&str; 5] = [
    "Thinking...",
    "Reviewing your career path...",
    "Looking up industry insights...",
    "Weighing your options...",
    "Polishing the answer...",
];

const MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Rotates through `LOADING_PHRASES` while a request is in flight. The task
/// is aborted on `stop` or when dropped.
pub struct LoadingPhrases {
    worker: Option<JoinHandle<()>>,
}

impl LoadingPhrases {
    pub fn start(tx: mpsc::UnboundedSender<Event>, interval: Duration) -> LoadingPhrases {
        let worker = tokio::spawn(async move {
            let mut ticker = time::interval(interval.max(MIN_INTERVAL));
            let mut idx = 0;

            loop {
                ticker.tick().await;
                let phrase = LOADING_PHRASES[idx % LOADING_PHRASES.len()].to_string();
                if tx.send(Event::LoadingPhrase(phrase)).is_err() {
                    return;
                }
                idx += 1;
            }
        });

        return LoadingPhrases {
            worker: Some(worker),
        };
    }

    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        return self
            .worker
            .as_ref()
            .map(|worker| return !worker.is_finished())
            .unwrap_or(false);
    }
}

impl Drop for LoadingPhrases {
    fn drop(&mut self) {
        self.stop();
    }
}
