//! Outgoing messages through the Telegram Bot API.

use crate::error::{PracticeError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_URL: &str = "https://api.telegram.org";

/// Telegram rejects messages over 4096 characters; stay well below.
pub const MAX_CHUNK_LENGTH: usize = 3500;

/// Splits `text` on line boundaries into chunks shorter than `max_length`
/// characters, newlines included. A row that does not fit on its own is cut
/// on char boundaries. Empty chunks are dropped.
pub fn split_into_chunks(text: &str, max_length: usize) -> Vec<String> {
    let limit = max_length.saturating_sub(1).max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_length = 0;

    for row in text.split('\n') {
        for piece in split_row(row, limit) {
            let piece_length = piece.chars().count();
            let separator = usize::from(!current.is_empty());
            if current_length + separator + piece_length > limit {
                chunks.push(std::mem::take(&mut current));
                current_length = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_length += 1;
            }
            current.push_str(piece);
            current_length += piece_length;
        }
    }
    chunks.push(current);

    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Cuts `row` into pieces of at most `limit` chars.
fn split_row(row: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (count, (i, _)) in row.char_indices().enumerate() {
        if count > 0 && count % limit == 0 {
            pieces.push(&row[start..i]);
            start = i;
        }
    }
    pieces.push(&row[start..]);
    pieces
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    link_preview_options: LinkPreviewOptions,
}

#[derive(Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Outcome of sending a broadcast to one chat.
#[derive(Debug)]
pub struct Delivery {
    pub chat_id: i64,
    pub error: Option<String>,
}

impl Delivery {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct TelegramBot {
    client: Client,
    base_url: String,
}

impl TelegramBot {
    /// `token` is the full `<id>:<secret>` bot token. The client's timeout
    /// bounds every Bot API call.
    pub fn new(client: Client, token: &str) -> Self {
        Self::with_api_url(client, token, API_URL)
    }

    pub fn with_api_url(client: Client, token: &str, api_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    /// Sends `text` as HTML, split into as many messages as needed.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_into_chunks(text, MAX_CHUNK_LENGTH) {
            let request = SendMessage {
                chat_id,
                text: &chunk,
                parse_mode: "HTML",
                link_preview_options: LinkPreviewOptions { is_disabled: true },
            };

            let response = self
                .client
                .post(format!("{}/sendMessage", self.base_url))
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
                PracticeError::Api(format!("Unexpected Bot API response ({}): {}", status, e))
            })?;

            if !parsed.ok {
                return Err(PracticeError::Api(format!(
                    "sendMessage to {} failed: {}",
                    chat_id,
                    parsed.description.unwrap_or_else(|| status.to_string())
                )));
            }
            debug!("Sent {} characters to {}", chunk.chars().count(), chat_id);
        }
        Ok(())
    }

    /// Sends `text` to every chat one after another, pausing between chats.
    /// A failed chat is recorded and the rest still receive the message.
    pub async fn send_out(&self, chat_ids: &[i64], text: &str, pause: Duration) -> Vec<Delivery> {
        let mut deliveries = Vec::with_capacity(chat_ids.len());
        for (i, &chat_id) in chat_ids.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            let error = match self.send_text(chat_id, text).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("Failed to deliver to {}: {}", chat_id, e);
                    Some(e.to_string())
                }
            };
            deliveries.push(Delivery { chat_id, error });
        }
        deliveries
    }
}
