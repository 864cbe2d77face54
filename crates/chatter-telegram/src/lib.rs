//! Telegram adapter (teloxide).
//!
//! Implements the `chatter-core` `Transport` (long polling) and
//! `MessagingPort` (plain-text sends) over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::prelude::*;

use tokio::time::sleep;
use tracing::debug;

pub mod handlers;
pub mod router;

pub use router::TelegramTransport;
pub use teloxide::Bot;

use chatter_core::{
    domain::UserId as ChatUserId,
    errors::Error,
    messaging::{port::MessagingPort, types::OutgoingMessage},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(to: &ChatUserId) -> Result<teloxide::types::ChatId> {
        to.as_str()
            .trim()
            .parse::<i64>()
            .map(teloxide::types::ChatId)
            .map_err(|_| Error::Transport(format!("not a telegram chat id: {to}")))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, msg: OutgoingMessage) -> Result<()> {
        let chat = Self::tg_chat(&msg.to)?;
        if !msg.mentions.is_empty() {
            // Bot API mentions need message entities; the text is sent as-is.
            debug!(to = %msg.to, mentions = msg.mentions.len(), "mentions not rendered");
        }
        self.with_retry(|| self.bot.send_message(chat, msg.text.clone()))
            .await?;
        Ok(())
    }
}
