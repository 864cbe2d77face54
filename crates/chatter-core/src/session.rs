//! Per-user, in-memory session counters. Lost on restart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{clock::SharedClock, domain::UserId};

/// Above this many messages the history is trimmed on every update.
pub const HISTORY_TRIM_AFTER: u64 = 100;
/// Number of history entries kept by a trim.
pub const HISTORY_KEEP: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub last_active: DateTime<Utc>,
    pub message_count: u64,
    pub context: Vec<String>,
}

impl SessionRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_active: now,
            message_count: 0,
            context: Vec::new(),
        }
    }

    /// Whether the message just recorded was the user's first in this process.
    pub fn is_first_message(&self) -> bool {
        self.message_count == 1
    }
}

/// Owned map of sessions keyed by user id.
pub struct SessionTracker {
    clock: SharedClock,
    sessions: HashMap<UserId, SessionRecord>,
}

impl SessionTracker {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            sessions: HashMap::new(),
        }
    }

    /// Existing session, or a fresh one created now.
    pub fn get(&mut self, user_id: &UserId) -> &mut SessionRecord {
        let now = self.clock.now();
        self.sessions
            .entry(user_id.clone())
            .or_insert_with(|| SessionRecord::new(now))
    }

    pub fn peek(&self, user_id: &UserId) -> Option<&SessionRecord> {
        self.sessions.get(user_id)
    }

    /// Record one inbound message.
    pub fn update(&mut self, user_id: &UserId, text: &str) -> &SessionRecord {
        let now = self.clock.now();
        let session = self.get(user_id);
        session.last_active = now;
        session.message_count += 1;
        session.context.push(text.to_string());
        if session.message_count > HISTORY_TRIM_AFTER && session.context.len() > HISTORY_KEEP {
            let drop = session.context.len() - HISTORY_KEEP;
            session.context.drain(..drop);
        }
        session
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
