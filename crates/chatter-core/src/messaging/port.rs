use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    messaging::types::{OutgoingMessage, TransportEvent},
    Result,
};

/// Outbound side of a messaging client.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, msg: OutgoingMessage) -> Result<()>;
}

/// Connection driver of a messaging client.
///
/// `connect` runs one connection: it reports lifecycle and inbound messages on
/// `events` and returns once the connection is gone (after sending
/// `TransportEvent::Closed`) or `shutdown` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(
        &self,
        events: mpsc::Sender<TransportEvent>,
        shutdown: CancellationToken,
    ) -> Result<()>;
}
