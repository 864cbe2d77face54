//! Stdin/stdout messaging client for running the bot without a network.

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::{mpsc, Mutex},
};
use tokio_util::sync::CancellationToken;

use chatter_core::{
    messaging::{
        port::{MessagingPort, Transport},
        types::{DisconnectReason, InboundMessage, OutgoingMessage, TransportEvent},
    },
    Result,
};

pub const CONSOLE_USER: &str = "console";

/// Reads one message per line. End of input logs the console user out.
pub struct ConsoleTransport<R> {
    input: Mutex<R>,
}

impl ConsoleTransport<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsoleTransport<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> Transport for ConsoleTransport<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn connect(
        &self,
        events: mpsc::Sender<TransportEvent>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let mut input = self.input.lock().await;
        if events.send(TransportEvent::Open).await.is_err() {
            return Ok(());
        }

        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                read = input.read_line(&mut line) => read?,
            };
            if read == 0 {
                let _ = events
                    .send(TransportEvent::Closed(DisconnectReason::LoggedOut))
                    .await;
                return Ok(());
            }

            let text = line.trim_end_matches(['\r', '\n']);
            let msg = InboundMessage::text(CONSOLE_USER, text).with_name("Console");
            let sent = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                sent = events.send(TransportEvent::Message(msg)) => sent,
            };
            if sent.is_err() {
                return Ok(());
            }
        }
    }
}

/// Prints replies, one block per message.
pub struct ConsoleMessenger<W> {
    out: Mutex<W>,
}

impl ConsoleMessenger<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleMessenger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

pub fn render(msg: &OutgoingMessage) -> String {
    format!("[to {}]\n{}\n\n", msg.to, msg.text)
}

#[async_trait]
impl<W> MessagingPort for ConsoleMessenger<W>
where
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    async fn send_text(&self, msg: OutgoingMessage) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(render(&msg).as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}
