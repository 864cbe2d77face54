//! Connection supervision and the per-message handler.
//!
//! The gateway owns the `ChatBot`, pulls events from a `Transport` one at a
//! time and answers through a `MessagingPort`. A closed connection is
//! restarted after a flat delay unless the service logged us out; every
//! restart reloads the bot from disk with fresh sessions.

use std::{fs, sync::Arc};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    bot::ChatBot,
    config::Config,
    domain::UserId,
    errors::Error,
    formatting::preview,
    messaging::{
        port::{MessagingPort, Transport},
        types::{DisconnectReason, InboundMessage, OutgoingMessage, TransportEvent},
    },
    scheduler::{ScheduledTask, Scheduler, TaskOutcome},
    Result,
};

pub const APOLOGY: &str = "Oops! Something went wrong. Please try again. ⚠️";

const EVENT_BUFFER: usize = 64;
const LOG_PREVIEW_CHARS: usize = 50;

/// Create the working directories, ignoring failures.
pub fn bootstrap_directories(cfg: &Config) {
    for dir in cfg.bootstrap_dirs() {
        if let Err(e) = fs::create_dir_all(dir) {
            debug!(dir = %dir.display(), error = %e, "could not create directory");
        }
    }
}

pub fn welcome_text(bot_name: &str, user_name: &str) -> String {
    format!(
        "👋 *Welcome {user_name}!*\n\n\
I'm {bot_name} AI Assistant. Type *menu* to see what I can do!\n\n\
Start chatting with me or explore the menu options. 🤖"
    )
}

pub fn group_welcome_text(bot_name: &str, participants: &[UserId]) -> String {
    let tags = participants
        .iter()
        .map(|p| format!("@{}", p.local_part()))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "👋 Welcome to the group, {tags}!\n\n\
I'm {bot_name} AI Bot. Type *menu* to see my features!"
    )
}

pub struct Gateway {
    cfg: Arc<Config>,
    bot: ChatBot,
    messenger: Arc<dyn MessagingPort>,
    shutdown: CancellationToken,
    scheduler: Scheduler,
    pending: Vec<ScheduledTask>,
}

impl Gateway {
    pub fn new(
        cfg: Arc<Config>,
        bot: ChatBot,
        messenger: Arc<dyn MessagingPort>,
        shutdown: CancellationToken,
    ) -> Self {
        let scheduler = Scheduler::with_parent(&shutdown);
        Self {
            cfg,
            bot,
            messenger,
            shutdown,
            scheduler,
            pending: Vec::new(),
        }
    }

    /// Scheduled messages that have not fired yet.
    pub fn pending_tasks(&mut self) -> usize {
        self.pending.retain(|t| !t.is_finished());
        self.pending.len()
    }

    /// Connect, serve, reconnect. Returns on shutdown or when logged out.
    pub async fn run(mut self, transport: Arc<dyn Transport>) -> Result<()> {
        let mut reconnecting = false;
        loop {
            bootstrap_directories(&self.cfg);
            if reconnecting {
                self.bot = ChatBot::from_config(&self.cfg, self.bot.clock())?;
            }
            reconnecting = true;

            let reason = self.run_connection(transport.clone()).await;
            match reason {
                None => {
                    info!("shutting down");
                    self.scheduler.shutdown();
                    return Ok(());
                }
                Some(DisconnectReason::LoggedOut) => {
                    error!("logged out; not reconnecting");
                    self.scheduler.shutdown();
                    return Err(Error::LoggedOut);
                }
                Some(reason) => {
                    warn!(
                        ?reason,
                        delay_ms = self.cfg.reconnect_delay.as_millis() as u64,
                        "connection closed, reconnecting"
                    );
                    let wait = self.scheduler.delay("reconnect", self.cfg.reconnect_delay);
                    if wait.wait().await == TaskOutcome::Cancelled {
                        info!("shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Serve one connection. `None` means shutdown was requested.
    async fn run_connection(&mut self, transport: Arc<dyn Transport>) -> Option<DisconnectReason> {
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let conn_token = self.shutdown.child_token();
        let driver = {
            let token = conn_token.clone();
            tokio::spawn(async move { transport.connect(tx, token).await })
        };

        let shutdown = self.shutdown.clone();
        let mut reason = None;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                ev = rx.recv() => match ev {
                    Some(TransportEvent::Closed(r)) => {
                        reason = Some(r);
                        break;
                    }
                    Some(ev) => self.handle_event(ev).await,
                    None => {
                        reason = Some(DisconnectReason::ConnectionLost);
                        break;
                    }
                },
            }
        }

        conn_token.cancel();
        // Unblocks a transport parked on a full channel.
        drop(rx);
        match driver.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "transport stopped with an error"),
            Err(e) => warn!(error = %e, "transport task failed"),
        }

        if self.shutdown.is_cancelled() {
            None
        } else {
            reason
        }
    }

    pub async fn handle_event(&mut self, ev: TransportEvent) {
        match ev {
            TransportEvent::Qr(code) => {
                info!(%code, "pairing required: scan this code with the messaging app");
            }
            TransportEvent::Open => {
                info!("connected; menu, auto-reply and responder ready");
            }
            TransportEvent::CredentialsUpdated => debug!("credentials updated"),
            TransportEvent::Message(msg) => self.handle_inbound(msg).await,
            TransportEvent::ParticipantsAdded {
                group,
                participants,
            } => {
                let text = group_welcome_text(&self.cfg.bot_name, &participants);
                let out = OutgoingMessage::new(group.clone(), text).with_mentions(participants);
                if let Err(e) = self.messenger.send_text(out).await {
                    warn!(%group, error = %e, "failed to welcome new participants");
                }
            }
            TransportEvent::Closed(reason) => debug!(?reason, "closed event outside a connection"),
        }
    }

    pub async fn handle_inbound(&mut self, msg: InboundMessage) {
        if msg.from_me {
            return;
        }

        let text = msg.payload.extract_text().to_string();
        if !text.is_empty() {
            if let Err(e) = self.reply(&msg, &text).await {
                error!(user = %msg.sender, error = %e, "error handling message");
                let apology = OutgoingMessage::new(msg.sender.clone(), APOLOGY);
                if let Err(e) = self.messenger.send_text(apology).await {
                    warn!(user = %msg.sender, error = %e, "failed to send apology");
                }
            }
        }

        if self.bot.session(&msg.sender).is_first_message() {
            self.schedule_welcome(msg.sender.clone(), msg.name_or_default().to_string());
        }
    }

    async fn reply(&mut self, msg: &InboundMessage, text: &str) -> Result<()> {
        let reply = self
            .bot
            .handle_message(text, &msg.sender, msg.display_name.as_deref())?;
        let Some(reply) = reply else {
            return Ok(());
        };

        let mentions = if text.contains('@') {
            vec![msg.sender.clone()]
        } else {
            Vec::new()
        };
        let out = OutgoingMessage::new(msg.sender.clone(), reply.clone()).with_mentions(mentions);
        self.messenger.send_text(out).await?;

        info!(
            from = msg.name_or_default(),
            message = %preview(text, LOG_PREVIEW_CHARS),
            response = %preview(&reply, LOG_PREVIEW_CHARS),
            "answered"
        );
        Ok(())
    }

    fn schedule_welcome(&mut self, to: UserId, name: String) {
        let messenger = self.messenger.clone();
        let text = welcome_text(&self.cfg.bot_name, &name);
        let task = self
            .scheduler
            .after("welcome", self.cfg.welcome_delay, async move {
                if let Err(e) = messenger.send_text(OutgoingMessage::new(to.clone(), text)).await {
                    warn!(user = %to, error = %e, "failed to send welcome");
                }
            });
        self.pending.retain(|t| !t.is_finished());
        self.pending.push(task);
    }
}
