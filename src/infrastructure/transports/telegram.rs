#[cfg(test)]
#[path = "telegram_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatTransport;
use crate::domain::models::ChatUpdate;
use crate::domain::models::IncomingMessage;

/// Telegram rejects messages longer than this many characters.
const MAX_MESSAGE_LENGTH: usize = 4096;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            let description = self.description.unwrap_or_default();
            tracing::error!(method, description, "Telegram request failed");
            bail!(format!("Telegram {method} failed, {description}"));
        }

        if let Some(result) = self.result {
            return Ok(result);
        }

        bail!(format!("Telegram {method} returned no result"));
    }
}

/// Splits text into chunks Telegram will accept, counting characters rather
/// than bytes.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let chars = text.chars().collect::<Vec<char>>();
    if chars.is_empty() {
        return vec![];
    }

    return chars
        .chunks(max_len.max(1))
        .map(|chunk| return chunk.iter().collect::<String>())
        .collect();
}

/// Request URLs carry the bot token, which must never reach the logs.
fn redact(err: reqwest::Error) -> reqwest::Error {
    return err.without_url();
}

pub struct Telegram {
    url: String,
    token: String,
    poll_timeout: String,
    timeout: String,
}

impl Default for Telegram {
    fn default() -> Telegram {
        return Telegram {
            url: Config::get(ConfigKey::TelegramURL),
            token: Config::get(ConfigKey::TelegramToken),
            poll_timeout: Config::get(ConfigKey::PollTimeout),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

impl Telegram {
    fn method_url(&self, method: &str) -> String {
        return format!(
            "{url}/bot{token}/{method}",
            url = self.url.trim_end_matches('/'),
            token = self.token
        );
    }
}

#[async_trait]
impl ChatTransport for Telegram {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Telegram URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Telegram token is not defined, set TELEGRAM_BOT_TOKEN");
        }

        let res = reqwest::Client::new()
            .get(self.method_url("getMe"))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?redact(err), "Telegram is not reachable");
                bail!("Telegram is not reachable");
            }
        };

        let status = res.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Telegram health check failed");
            bail!("Telegram health check failed, check the bot token");
        }

        let me = res
            .json::<ApiResponse<User>>()
            .await
            .map_err(redact)?
            .into_result("getMe")?;
        tracing::info!(
            id = me.id,
            username = me.username.unwrap_or_default(),
            "Connected to Telegram"
        );

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>> {
        let poll_timeout = self.poll_timeout.parse::<u64>()?;
        let req = GetUpdatesRequest {
            offset,
            timeout: poll_timeout,
            allowed_updates: vec!["message".to_string()],
        };

        let updates = reqwest::Client::new()
            .post(self.method_url("getUpdates"))
            // Telegram holds the request open for up to poll_timeout seconds.
            .timeout(Duration::from_secs(poll_timeout + 10))
            .json(&req)
            .send()
            .await
            .map_err(redact)?
            .json::<ApiResponse<Vec<Update>>>()
            .await
            .map_err(redact)?
            .into_result("getUpdates")?;

        let res = updates
            .into_iter()
            .map(|update| {
                let message = update.message.and_then(|message| {
                    return message.text.map(|text| {
                        return IncomingMessage {
                            chat_id: message.chat.id,
                            text,
                        };
                    });
                });

                return ChatUpdate {
                    id: update.update_id,
                    message,
                };
            })
            .collect();

        return Ok(res);
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_LENGTH) {
            let req = SendMessageRequest {
                chat_id,
                text: chunk,
            };

            reqwest::Client::new()
                .post(self.method_url("sendMessage"))
                .json(&req)
                .send()
                .await
                .map_err(redact)?
                .json::<ApiResponse<Message>>()
                .await
                .map_err(redact)?
                .into_result("sendMessage")?;
        }

        return Ok(());
    }
}
