//! Outbound messaging.
//!
//! - [`SendMessage`]: the one operation the publisher needs
//! - [`TelegramBot`]: the live implementation, a Bot API `sendMessage` call
//! - [`DryRunSink`]: logs instead of sending, for `--dry-run`
//!
//! Sends are never retried here. A failure is reported to the caller, which
//! logs it, pauses and moves on.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::utils::truncate_for_log;

/// Something that can deliver one formatted message to the channel.
pub trait SendMessage {
    async fn send_message(&self, text: &str) -> Result<(), Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Error returned by the Bot API itself (as opposed to transport errors).
#[derive(Debug)]
pub struct TelegramError {
    pub status: u16,
    pub description: String,
}

impl fmt::Display for TelegramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Telegram API error {}: {}", self.status, self.description)
    }
}

impl Error for TelegramError {}

/// Telegram Bot API client bound to one channel.
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

// Manual impl keeps the token out of logs.
impl fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramBot")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramBot {
    pub fn new(
        api_base: &str,
        token: &str,
        chat_id: &str,
        timeout: Duration,
    ) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl SendMessage for TelegramBot {
    #[instrument(level = "debug", skip_all, fields(chat_id = %self.chat_id))]
    async fn send_message(&self, text: &str) -> Result<(), Box<dyn Error>> {
        let t0 = Instant::now();
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };
        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        let parsed: Result<ApiResponse, _> = response.json().await;

        match parsed {
            Ok(api) if api.ok && status.is_success() => {
                debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "sendMessage ok");
                Ok(())
            }
            Ok(api) => {
                let err = TelegramError {
                    status: api.error_code.unwrap_or(status.as_u16()),
                    description: api.description.unwrap_or_else(|| "no description".into()),
                };
                warn!(error = %err, "sendMessage rejected");
                Err(err.into())
            }
            Err(e) => Err(TelegramError {
                status: status.as_u16(),
                description: format!("unreadable response: {e}"),
            }
            .into()),
        }
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

impl SendMessage for DryRunSink {
    async fn send_message(&self, text: &str) -> Result<(), Box<dyn Error>> {
        info!(message = %truncate_for_log(text, 300), "Dry run; not sending");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = SendMessageRequest {
            chat_id: "@RugbyNews",
            text: "*Title*",
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["chat_id"], "@RugbyNews");
        assert_eq!(json["text"], "*Title*");
        assert_eq!(json["disable_web_page_preview"], false);
    }

    #[test]
    fn test_error_response_parses() {
        let api: ApiResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!api.ok);
        assert_eq!(api.error_code, Some(400));
        assert_eq!(api.description.as_deref(), Some("Bad Request: chat not found"));
    }

    #[test]
    fn test_endpoint_and_debug_hide_token() {
        let bot = TelegramBot::new(
            "https://api.telegram.org/",
            "123:secret",
            "@chan",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(bot.endpoint(), "https://api.telegram.org/bot123:secret/sendMessage");
        assert!(!format!("{bot:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        let bot = TelegramBot::new("http://127.0.0.1:1", "t", "@c", Duration::from_millis(500))
            .unwrap();
        assert!(bot.send_message("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        assert!(DryRunSink.send_message("hello").await.is_ok());
    }
}
