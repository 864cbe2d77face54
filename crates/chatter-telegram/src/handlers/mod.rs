//! Telegram update handlers.
//!
//! Each handler turns a Telegram update into `TransportEvent`s and forwards
//! them to the gateway. No replies are sent from here.

use teloxide::{prelude::*, types::User};
use tokio::sync::mpsc;
use tracing::debug;

use chatter_core::{
    domain::UserId as ChatUserId,
    messaging::types::{InboundMessage, MessagePayload, TransportEvent},
};

/// The bot's own Telegram user id, used to drop echoes of our own messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnId(pub u64);

/// Sender fields we care about, detached from teloxide's `User`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderInfo {
    pub id: u64,
    pub display_name: String,
    pub username: Option<String>,
    pub is_bot: bool,
}

impl From<&User> for SenderInfo {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.0,
            display_name: u.full_name(),
            username: u.username.clone(),
            is_bot: u.is_bot,
        }
    }
}

impl SenderInfo {
    /// `@handle` when the user has one, numeric id otherwise.
    pub fn mention_id(&self) -> ChatUserId {
        ChatUserId::new(self.username.clone().unwrap_or_else(|| self.id.to_string()))
    }
}

/// Build an inbound message. Replies go to the chat, so the chat id is the sender.
pub fn inbound_from_parts(
    chat_id: i64,
    sender: Option<&SenderInfo>,
    own: OwnId,
    text: Option<&str>,
    caption: Option<&str>,
) -> InboundMessage {
    InboundMessage {
        sender: ChatUserId::new(chat_id.to_string()),
        display_name: sender.map(|s| s.display_name.clone()),
        from_me: sender.is_some_and(|s| s.id == own.0),
        payload: MessagePayload {
            conversation: text.map(str::to_string),
            extended_text: None,
            image_caption: caption.map(str::to_string),
        },
    }
}

/// Group join announcement, skipping bots (including this one).
pub fn participants_added(chat_id: i64, members: &[SenderInfo]) -> Option<TransportEvent> {
    let participants: Vec<ChatUserId> = members
        .iter()
        .filter(|m| !m.is_bot)
        .map(SenderInfo::mention_id)
        .collect();
    if participants.is_empty() {
        return None;
    }
    Some(TransportEvent::ParticipantsAdded {
        group: ChatUserId::new(chat_id.to_string()),
        participants,
    })
}

pub async fn handle_message(
    msg: Message,
    events: mpsc::Sender<TransportEvent>,
    own: OwnId,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;

    if let Some(members) = msg.new_chat_members() {
        let members: Vec<SenderInfo> = members.iter().map(SenderInfo::from).collect();
        if let Some(ev) = participants_added(chat_id, &members) {
            forward(&events, ev).await;
        }
        return Ok(());
    }

    let sender = msg.from().map(SenderInfo::from);
    let inbound = inbound_from_parts(chat_id, sender.as_ref(), own, msg.text(), msg.caption());
    forward(&events, TransportEvent::Message(inbound)).await;
    Ok(())
}

async fn forward(events: &mpsc::Sender<TransportEvent>, ev: TransportEvent) {
    if events.send(ev).await.is_err() {
        debug!("gateway gone; dropping telegram update");
    }
}
