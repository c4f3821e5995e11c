pub mod answer_api;

use std::sync::Arc;

use crate::domain::models::AnswerServiceRef;

pub struct BackendManager {}

impl BackendManager {
    /// The answer service configured for this process.
    pub fn get() -> AnswerServiceRef {
        return Arc::new(answer_api::AnswerApi::default());
    }
}
