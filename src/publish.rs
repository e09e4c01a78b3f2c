//! Formatting and posting candidates to the channel.
//!
//! Every publish attempt is recorded in history, whether or not the send
//! went through: a failed send is not retried on the next run either.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use crate::api::SendMessage;
use crate::models::{Article, HistoryEntry};
use crate::utils::{epoch_seconds, truncate_for_log};

/// The only characters a backslash escapes in Telegram's legacy Markdown.
/// A backslash before anything else is shown as-is.
const MARKDOWN_SPECIAL: &[char] = &['_', '*', '`', '['];

/// Escape Markdown control characters so headline text renders literally.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render a candidate as a channel message: bold title, teaser, link.
///
/// The link is escaped as well; an `_` in a URL would otherwise open an
/// italic entity that never closes and the whole message is rejected.
pub fn format_message(article: &Article) -> String {
    let mut message = format!("*{}*\n\n", escape_markdown(&article.title));
    if !article.snippet.is_empty() {
        message.push_str(&escape_markdown(&article.snippet));
        message.push_str("\n\n");
    }
    message.push_str(&escape_markdown(&article.link));
    message
}

/// Sends candidates one at a time with a fixed pause between them.
#[derive(Debug)]
pub struct Publisher<S> {
    sink: S,
    post_delay: Duration,
    error_delay: Duration,
}

impl<S: SendMessage> Publisher<S> {
    pub fn new(sink: S, post_delay: Duration, error_delay: Duration) -> Self {
        Self {
            sink,
            post_delay,
            error_delay,
        }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send one candidate and record it in `history`.
    ///
    /// Returns whether the send succeeded. The history entry is appended
    /// either way.
    #[instrument(level = "info", skip_all, fields(link = %article.link))]
    pub async fn publish(
        &self,
        article: &Article,
        history: &mut Vec<HistoryEntry>,
        now: DateTime<Utc>,
    ) -> bool {
        let message = format_message(article);
        let sent = match self.sink.send_message(&message).await {
            Ok(()) => {
                info!(message = %truncate_for_log(&message, 50), "Posted");
                true
            }
            Err(e) => {
                error!(error = %e, title = %article.title, "Telegram error");
                sleep(self.error_delay).await;
                false
            }
        };

        history.push(HistoryEntry::new(
            article.title.clone(),
            article.link.clone(),
            epoch_seconds(now),
        ));
        sleep(self.post_delay).await;
        sent
    }
}
