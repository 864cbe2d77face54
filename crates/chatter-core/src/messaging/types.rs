use crate::domain::UserId;

/// Text-bearing parts of an inbound message. Any of them may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessagePayload {
    pub conversation: Option<String>,
    pub extended_text: Option<String>,
    pub image_caption: Option<String>,
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            conversation: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn caption(caption: impl Into<String>) -> Self {
        Self {
            image_caption: Some(caption.into()),
            ..Self::default()
        }
    }

    /// First non-empty text in priority order, or `""`.
    pub fn extract_text(&self) -> &str {
        [&self.conversation, &self.extended_text, &self.image_caption]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message arrived in; replies go here.
    pub sender: UserId,
    pub display_name: Option<String>,
    /// Sent by this bot's own account (echoes, other devices).
    pub from_me: bool,
    pub payload: MessagePayload,
}

impl InboundMessage {
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: UserId::new(sender),
            display_name: None,
            from_me: false,
            payload: MessagePayload::text(text),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn name_or_default(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("User")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: UserId,
    pub text: String,
    pub mentions: Vec<UserId>,
}

impl OutgoingMessage {
    pub fn new(to: UserId, text: impl Into<String>) -> Self {
        Self {
            to,
            text: text.into(),
            mentions: Vec::new(),
        }
    }

    pub fn with_mentions(mut self, mentions: Vec<UserId>) -> Self {
        self.mentions = mentions;
        self
    }
}

/// Why a connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Credentials were revoked. No automatic recovery.
    LoggedOut,
    ConnectionLost,
    Other(String),
}

/// Everything a transport reports to the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Pairing challenge to show to the operator.
    Qr(String),
    Open,
    CredentialsUpdated,
    Message(InboundMessage),
    ParticipantsAdded {
        group: UserId,
        participants: Vec<UserId>,
    },
    Closed(DisconnectReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_prefers_conversation_then_extended_then_caption() {
        let p = MessagePayload {
            conversation: None,
            extended_text: Some("ext".into()),
            image_caption: Some("cap".into()),
        };
        assert_eq!(p.extract_text(), "ext");
        assert_eq!(MessagePayload::caption("cap").extract_text(), "cap");
        assert_eq!(MessagePayload::text("hi").extract_text(), "hi");
    }

    #[test]
    fn extract_text_tolerates_missing_parts() {
        assert_eq!(MessagePayload::default().extract_text(), "");
        let p = MessagePayload {
            conversation: Some(String::new()),
            extended_text: None,
            image_caption: Some("cap".into()),
        };
        assert_eq!(p.extract_text(), "cap");
    }

    #[test]
    fn blank_display_name_falls_back() {
        let m = InboundMessage::text("1", "x").with_name("  ");
        assert_eq!(m.name_or_default(), "User");
        assert_eq!(InboundMessage::text("1", "x").with_name("Ada").name_or_default(), "Ada");
    }
}
