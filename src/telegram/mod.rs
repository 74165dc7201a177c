//! Minimal Telegram Bot API client.
//!
//! Covers exactly what the bot needs: long-polled updates, sending and
//! editing text messages, and downloading photo content.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{FruitBotError, Result};

const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 30;
// Must exceed the long-poll timeout or every idle poll aborts early.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// The largest rendition of an attached photo, if any.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_deref()?
            .iter()
            .max_by_key(|p| p.width * p.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

pub struct TelegramClient {
    http_client: reqwest::Client,
    api_base: String,
    file_base: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_base: format!("{TELEGRAM_BASE_URL}/bot{bot_token}"),
            file_base: format!("{TELEGRAM_BASE_URL}/file/bot{bot_token}"),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> Result<T> {
        let url = format!("{}/{}", self.api_base, method);

        let envelope: ApiResponse<T> = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(FruitBotError::Telegram(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed without description")),
            ));
        }

        envelope
            .result
            .ok_or_else(|| FruitBotError::Telegram(format!("{method} returned no result")))
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )
        .await
    }

    /// Edit a previously sent message in place (used for the "đang nhận
    /// diện…" status message).
    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        // Telegram returns the edited Message; nothing downstream needs it.
        let _: Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        self.call("getFile", json!({ "file_id": file_id })).await
    }

    /// Download file content by the path `getFile` returned.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.file_base, file_path);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FruitBotError::Telegram(format!(
                "file download failed with status {status}"
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
