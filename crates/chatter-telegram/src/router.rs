use std::time::Duration;

use async_trait::async_trait;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*, ApiError, RequestError};
use tokio::{sync::mpsc, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chatter_core::{
    messaging::{
        port::Transport,
        types::{DisconnectReason, TransportEvent},
    },
    Result,
};

use crate::handlers::{self, OwnId};

const SHUTDOWN_RETRY: Duration = Duration::from_millis(100);

/// Long-polling connection to the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Revoked or invalid tokens cannot recover by reconnecting.
pub fn classify_error(e: &RequestError) -> DisconnectReason {
    match e {
        RequestError::Api(ApiError::NotFound) => DisconnectReason::LoggedOut,
        RequestError::Network(_) | RequestError::Io(_) => DisconnectReason::ConnectionLost,
        other => DisconnectReason::Other(other.to_string()),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn connect(
        &self,
        events: mpsc::Sender<TransportEvent>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let me = match self.bot.get_me().await {
            Ok(me) => me,
            Err(e) => {
                warn!(error = %e, "telegram login failed");
                let _ = events.send(TransportEvent::Closed(classify_error(&e))).await;
                return Ok(());
            }
        };
        info!(username = %me.username(), "telegram bot authenticated");
        let _ = events.send(TransportEvent::Open).await;

        let handler =
            dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![events.clone(), OwnId(me.id.0)])
            .build();

        let stop = dispatcher.shutdown_token();
        let watcher = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                shutdown.cancelled().await;
                // Refused while the dispatcher is still starting up.
                loop {
                    match stop.shutdown() {
                        Ok(done) => break done.await,
                        Err(_) => sleep(SHUTDOWN_RETRY).await,
                    }
                }
            })
        };

        dispatcher.dispatch().await;
        watcher.abort();

        if !shutdown.is_cancelled() {
            let _ = events
                .send(TransportEvent::Closed(DisconnectReason::ConnectionLost))
                .await;
        }
        Ok(())
    }
}
