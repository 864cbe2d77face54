//! Per-message dispatcher: menu, then auto-reply, then the responder.

use tracing::debug;

use crate::{
    auto_reply::AutoReplyMatcher,
    clock::SharedClock,
    config::Config,
    context::ContextStore,
    domain::UserId,
    menu::{MenuKind, MenuRegistry},
    responder::{PatternResponder, Responder},
    session::{SessionRecord, SessionTracker},
    Result,
};

/// Everything needed to answer one message. Owned by the gateway loop.
pub struct ChatBot {
    menu: MenuRegistry,
    auto_reply: AutoReplyMatcher,
    responder: Responder,
    sessions: SessionTracker,
    clock: SharedClock,
}

/// Which stage produced a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Menu,
    MenuSelection,
    AutoReply,
    Responder,
}

impl ChatBot {
    pub fn new(context: ContextStore, clock: SharedClock) -> Result<Self> {
        Ok(Self {
            menu: MenuRegistry,
            auto_reply: AutoReplyMatcher::default(),
            responder: Responder::new(PatternResponder::new()?, context, clock.clone()),
            sessions: SessionTracker::new(clock.clone()),
            clock,
        })
    }

    /// Load the context file named by `cfg` and build a bot around it.
    pub fn from_config(cfg: &Config, clock: SharedClock) -> Result<Self> {
        let context = ContextStore::load(cfg.context_file()).with_learned_limit(cfg.learned_limit);
        Self::new(context, clock)
    }

    pub fn session(&mut self, user_id: &UserId) -> &SessionRecord {
        self.sessions.get(user_id)
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    pub fn handle_message(
        &mut self,
        text: &str,
        user_id: &UserId,
        name: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .dispatch(text, user_id, name)
            .map(|(source, reply)| {
                debug!(user = %user_id, ?source, "reply selected");
                reply
            }))
    }

    /// Like `handle_message`, also reporting which stage answered.
    pub fn dispatch(
        &mut self,
        text: &str,
        user_id: &UserId,
        name: Option<&str>,
    ) -> Option<(ReplySource, String)> {
        self.sessions.update(user_id, text);

        let clean = text.trim().to_lowercase();

        if clean == "menu" || clean == "0" {
            let main = self.menu.get_menu(MenuKind::Main).to_string();
            return Some((ReplySource::Menu, main));
        }

        if let Some(reply) = self
            .menu
            .process_selection(&clean, &self.clock.local_now())
        {
            return Some((ReplySource::MenuSelection, reply));
        }

        if let Some(reply) = self.auto_reply.check(&clean) {
            return Some((ReplySource::AutoReply, reply));
        }

        let reply = self.responder.generate_response(text, user_id, name);
        Some((ReplySource::Responder, reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auto_reply::GROUP_REPLIES,
        clock::ManualClock,
        menu::{JOKES, JOKE_PREFIX, MAIN_MENU},
        responder::{FAMILIAR_REPLIES, FILLER_REPLY},
    };
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn bot(dir: &tempfile::TempDir) -> ChatBot {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap());
        ChatBot::new(
            ContextStore::load(dir.path().join("memory.json")),
            Arc::new(clock),
        )
        .unwrap()
    }

    #[test]
    fn menu_command_always_returns_main_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let u = UserId::from("u");
        b.handle_message("purple carrots", &u, None).unwrap();
        for input in ["menu", "0", "  MENU  "] {
            assert_eq!(
                b.dispatch(input, &u, None),
                Some((ReplySource::Menu, MAIN_MENU.to_string()))
            );
        }
    }

    #[test]
    fn joke_selection_returns_a_listed_joke() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let (source, reply) = b.dispatch(" Joke ", &UserId::from("u"), None).unwrap();
        assert_eq!(source, ReplySource::MenuSelection);
        assert!(JOKES.contains(&reply.strip_prefix(JOKE_PREFIX).unwrap()));
    }

    #[test]
    fn auto_reply_beats_greeting_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let (source, reply) = b.dispatch("hello urgent", &UserId::from("u"), None).unwrap();
        assert_eq!(source, ReplySource::AutoReply);
        assert!(GROUP_REPLIES.contains(&reply.as_str()));
    }

    #[test]
    fn hello_goes_to_the_pattern_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let reply = b.handle_message("hello", &UserId::from("u"), None).unwrap().unwrap();
        assert!(["Hello! 👋", "Hi there!", "Hey! How can I help?"].contains(&reply.as_str()));
    }

    #[test]
    fn repeated_unknown_input_becomes_familiar_on_third_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let u = UserId::from("u");
        let replies: Vec<String> = (0..3)
            .map(|_| b.handle_message("purple carrots", &u, None).unwrap().unwrap())
            .collect();
        assert_eq!(replies[0], FILLER_REPLY);
        assert_eq!(replies[1], FILLER_REPLY);
        assert!(FAMILIAR_REPLIES.contains(&replies[2].as_str()));
    }

    #[test]
    fn each_message_bumps_the_session_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        let u = UserId::from("u");
        for (i, input) in ["menu", "2", "urgent", "hello", "purple carrots"]
            .iter()
            .enumerate()
        {
            b.handle_message(input, &u, None).unwrap();
            assert_eq!(b.session(&u).message_count, i as u64 + 1);
        }
        assert_eq!(b.sessions().len(), 1);
    }

    #[test]
    fn menu_paths_do_not_touch_the_context_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = bot(&dir);
        b.handle_message("menu", &UserId::from("u"), None).unwrap();
        assert!(!dir.path().join("memory.json").exists());
        b.handle_message("hello", &UserId::from("u"), None).unwrap();
        assert!(dir.path().join("memory.json").exists());
    }
}
