//! Regex reply table plus the learning fallback for unmatched input.

use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::{
    clock::SharedClock,
    context::ContextStore,
    domain::UserId,
    formatting::{calendar_date, clock_time},
    utils::{pick, pick_str},
    Result,
};

/// Learned entries answer with a familiar reply once seen more than this often.
pub const FAMILIAR_AFTER: u64 = 2;

pub const QUESTION_REPLIES: &[&str] = &[
    "That's an interesting question!",
    "I'm still learning about that!",
    "Good question!",
];

pub const GREETING_REPLIES: &[&str] = &["Nice to see you again!", "Welcome back!"];

pub const FAMILIAR_REPLIES: &[&str] = &[
    "You mentioned that before!",
    "We talked about this earlier!",
    "I remember you saying something similar!",
    "This seems familiar!",
];

pub const FILLER_REPLY: &str = "That's interesting! Tell me more about it! 🤔";

const QUESTION_WORDS: &[&str] = &["what", "why", "how", "when", "where", "who"];
const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];

/// One candidate answer of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(&'static str),
    /// "It's currently <time>", evaluated when chosen.
    CurrentTime,
    /// "Today is <date>", evaluated when chosen.
    CurrentDate,
}

impl Reply {
    pub fn render(&self, now: &DateTime<Local>) -> String {
        match self {
            Reply::Text(s) => s.to_string(),
            Reply::CurrentTime => format!("It's currently {}", clock_time(now)),
            Reply::CurrentDate => format!("Today is {}", calendar_date(now)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PatternRule {
    pattern: Regex,
    replies: Vec<Reply>,
}

impl PatternRule {
    pub fn new(pattern: &str, replies: Vec<Reply>) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern, replies })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }
}

fn texts(items: &[&'static str]) -> Vec<Reply> {
    items.iter().map(|s| Reply::Text(*s)).collect()
}

/// The built-in table. Order matters: the first matching pattern answers.
fn default_rules() -> Result<Vec<PatternRule>> {
    use Reply::{CurrentDate, CurrentTime};

    Ok(vec![
        PatternRule::new(
            "hello|hi|hey|hola|namaste",
            texts(&["Hello! 👋", "Hi there!", "Hey! How can I help?"]),
        )?,
        PatternRule::new(
            "how are you|how are u|how r u",
            texts(&["I'm great! Thanks for asking!", "Doing well! How about you?"]),
        )?,
        PatternRule::new(
            "your name|who are you",
            texts(&["I'm KING_BLESS AI Assistant! 🤖", "I'm your friendly AI bot!"]),
        )?,
        PatternRule::new(
            "thank you|thanks|thx",
            texts(&["You're welcome! 😊", "Anytime!", "Glad to help!"]),
        )?,
        PatternRule::new(
            "bye|goodbye|see you",
            texts(&["Goodbye! 👋", "See you later!", "Take care!"]),
        )?,
        PatternRule::new("help|menu|commands", texts(&["I'll send you the menu!"]))?,
        PatternRule::new(
            "joke|tell me a joke",
            texts(&[
                "Why don't scientists trust atoms? Because they make up everything! 😄",
                "Why did the scarecrow win an award? He was outstanding in his field! 🌾",
            ]),
        )?,
        PatternRule::new("time|what time|current time", vec![CurrentTime])?,
        PatternRule::new("date|today's date", vec![CurrentDate])?,
        PatternRule::new(
            "weather",
            texts(&["I'm a bot, not a weather station! 🌤️ But you can check your local weather app."]),
        )?,
        PatternRule::new(
            "love you|i love you",
            texts(&["Aww, thank you! ❤️", "You're sweet!"]),
        )?,
        PatternRule::new(
            "who created you|who made you",
            texts(&["I was created by KING_BLESS! 👑", "KING_BLESS is my creator!"]),
        )?,
        PatternRule::new(
            "what can you do|features",
            texts(&["I can chat, tell jokes, remember things, and much more! Check the menu."]),
        )?,
        PatternRule::new(
            "hi|hi bot|hello bot",
            texts(&["Hello! 👋 Type *menu* to see what I can do!"]),
        )?,
    ])
}

/// Ordered (pattern, replies) table. First match wins, no scoring.
#[derive(Clone, Debug)]
pub struct PatternResponder {
    rules: Vec<PatternRule>,
}

impl PatternResponder {
    pub fn new() -> Result<Self> {
        Ok(Self::from_rules(default_rules()?))
    }

    pub fn from_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First rule whose pattern matches anywhere in `text`.
    pub fn matching_rule(&self, text: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.pattern.is_match(text))
    }

    pub fn respond(&self, text: &str, now: &DateTime<Local>) -> Option<String> {
        let rule = self.matching_rule(text)?;
        pick(&rule.replies).map(|r| r.render(now))
    }
}

/// Lexical shape of an input that no pattern recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Question,
    Greeting,
    Statement,
}

pub fn classify(text: &str) -> InputKind {
    let lower = text.to_lowercase();
    let has_word = |set: &[&str]| lower.split_whitespace().any(|w| set.contains(&w));

    if lower.contains('?') || has_word(QUESTION_WORDS) {
        return InputKind::Question;
    }
    if has_word(GREETING_WORDS) {
        return InputKind::Greeting;
    }
    InputKind::Statement
}

/// Pattern table backed by the persisted context and its learning table.
pub struct Responder {
    patterns: PatternResponder,
    context: ContextStore,
    clock: SharedClock,
}

impl Responder {
    pub fn new(patterns: PatternResponder, context: ContextStore, clock: SharedClock) -> Self {
        Self {
            patterns,
            context,
            clock,
        }
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Answer free text. Always produces a reply and saves the context.
    pub fn generate_response(&mut self, text: &str, user_id: &UserId, name: Option<&str>) -> String {
        let now = self.clock.now();
        self.context.touch_user(user_id, name, now);

        if let Some(reply) = self.patterns.respond(text, &self.clock.local_now()) {
            self.context.save();
            return reply;
        }

        let reply = match classify(text) {
            InputKind::Question => pick_str(QUESTION_REPLIES),
            InputKind::Greeting => pick_str(GREETING_REPLIES),
            InputKind::Statement => {
                let count = self.context.learn(text, now);
                debug!(user = %user_id, count, "learned input");
                if count > FAMILIAR_AFTER {
                    pick_str(FAMILIAR_REPLIES)
                } else {
                    None
                }
            }
        };

        self.context.save();
        reply.unwrap_or_else(|| FILLER_REPLY.to_string())
    }
}
