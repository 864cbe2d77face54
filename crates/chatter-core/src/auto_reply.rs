//! Canned replies for attention-grabbing words.

use crate::utils::pick_str;

#[derive(Clone, Debug)]
struct KeywordReplies {
    keyword: &'static str,
    replies: &'static [&'static str],
}

/// Group mentions are checked before plain keywords.
#[derive(Clone, Debug)]
pub struct AutoReplyMatcher {
    group_triggers: &'static [&'static str],
    group_replies: &'static [&'static str],
    keywords: Vec<KeywordReplies>,
}

pub const GROUP_TRIGGERS: &[&str] = &["@everyone", "@all", "attention", "urgent"];
pub const GROUP_REPLIES: &[&str] = &["I got your attention! 👀", "What's up?", "Yes, I'm here!"];

impl Default for AutoReplyMatcher {
    fn default() -> Self {
        Self {
            group_triggers: GROUP_TRIGGERS,
            group_replies: GROUP_REPLIES,
            keywords: vec![
                KeywordReplies {
                    keyword: "bot",
                    replies: &["That's me! 🤖", "Bot at your service!", "Yes?"],
                },
                KeywordReplies {
                    keyword: "help",
                    replies: &["I'll help you!", "Need assistance?", "How can I assist?"],
                },
                KeywordReplies {
                    keyword: "urgent",
                    replies: &[
                        "This sounds urgent!",
                        "Priority alert! 🚨",
                        "Immediate attention needed!",
                    ],
                },
            ],
        }
    }
}

impl AutoReplyMatcher {
    pub fn check(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();

        if self.group_triggers.iter().any(|t| lower.contains(t)) {
            return pick_str(self.group_replies);
        }

        self.keywords
            .iter()
            .find(|k| lower.contains(k.keyword))
            .and_then(|k| pick_str(k.replies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_mentions_win_over_keywords() {
        let m = AutoReplyMatcher::default();
        // "urgent" is both a group trigger and a keyword; the group set is checked first.
        for input in ["URGENT: server down", "@everyone bot check", "attention please"] {
            let reply = m.check(input).unwrap();
            assert!(GROUP_REPLIES.contains(&reply.as_str()), "{input} -> {reply}");
        }
    }

    #[test]
    fn keywords_match_as_substrings() {
        let m = AutoReplyMatcher::default();
        let reply = m.check("is this a robot").unwrap();
        assert!(["That's me! 🤖", "Bot at your service!", "Yes?"].contains(&reply.as_str()));

        let reply = m.check("I need HELP").unwrap();
        assert!(["I'll help you!", "Need assistance?", "How can I assist?"]
            .contains(&reply.as_str()));
    }

    #[test]
    fn nothing_matches_plain_chatter() {
        assert!(AutoReplyMatcher::default().check("purple carrots").is_none());
    }
}
