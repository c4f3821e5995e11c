#[cfg(test)]
#[path = "answer_api_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AnswerService;
use crate::domain::models::AskResponse;
use crate::domain::models::HistoryResponse;
use crate::domain::models::Message;

/// HTTP client for the Careerist backend.
pub struct AnswerApi {
    url: String,
    timeout: String,
}

impl Default for AnswerApi {
    fn default() -> AnswerApi {
        return AnswerApi::new(
            &Config::get(ConfigKey::ServiceURL),
            &Config::get(ConfigKey::HealthCheckTimeout),
        );
    }
}

impl AnswerApi {
    pub fn new(url: &str, timeout: &str) -> AnswerApi {
        return AnswerApi {
            url: url.trim_end_matches('/').to_string(),
            timeout: timeout.to_string(),
        };
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}/{path}", url = self.url);
    }
}

#[async_trait]
impl AnswerService for AnswerApi {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Careerist service URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(self.endpoint(""))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Careerist is not reachable");
                bail!("Careerist is not reachable");
            }
        };
        if status >= 400 {
            tracing::error!(status = status, "Careerist health check failed");
            bail!("Careerist health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn ask(&self, query: &str, session_id: &str) -> Result<AskResponse> {
        let res = reqwest::Client::new()
            .post(self.endpoint("ask"))
            .form(&[("query", query), ("session_id", session_id)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make ask request to Careerist");
            bail!(format!("Careerist answered with status {status}"));
        }

        let body = res.json::<AskResponse>().await?;
        return Ok(body);
    }

    #[allow(clippy::implicit_return)]
    async fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        let res = reqwest::Client::new()
            .get(self.endpoint("history"))
            .query(&[("session_id", session_id)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to fetch history from Careerist");
            bail!(format!("Careerist answered with status {status}"));
        }

        let body = res.json::<HistoryResponse>().await?;
        return Ok(body.chat_history);
    }

    #[allow(clippy::implicit_return)]
    async fn text_to_speech(&self, text: &str, lang: &str, voice: &str) -> Result<Vec<u8>> {
        let res = reqwest::Client::new()
            .post(self.endpoint("tts"))
            .form(&[("text", text), ("lang", lang), ("voice", voice)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make tts request to Careerist");
            bail!(format!("Careerist answered with status {status}"));
        }

        let audio = res.bytes().await?;
        return Ok(audio.to_vec());
    }
}
