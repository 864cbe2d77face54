//! Static menu pages and the numbered/named selection dispatcher.

use chrono::{DateTime, Local};

use crate::{
    formatting::{calendar_date, clock_time},
    utils::pick_str,
};

pub const MAIN_MENU: &str = "*🤖 KING_BLESS AI BOT MENU* 🤖\n\n\
*1.* 🗣️ Chat with AI\n\
*2.* 😄 Get a Joke\n\
*3.* 🕐 Current Time\n\
*4.* 📅 Today's Date\n\
*5.* 💾 Bot Info\n\
*6.* ❓ Help\n\
*7.* ⭐ Features\n\n\
*Reply with the number or type your message!*\n\
_Type 'menu' anytime to see this again!_";

pub const FEATURES_MENU: &str = "*🌟 BOT FEATURES* 🌟\n\n\
✅ AI-powered conversations\n\
✅ Context-aware responses\n\
✅ Auto-reply system\n\
✅ Memory retention\n\
✅ Jokes & Fun facts\n\
✅ Time & Date info\n\
✅ Customizable responses\n\
✅ No API keys needed\n\
✅ Group chat support\n\n\
_More features coming soon!_";

pub const INFO_MENU: &str = "*🤖 BOT INFORMATION* 🤖\n\n\
*Name:* KING_BLESS AI Assistant\n\
*Version:* 2.0.0\n\
*Creator:* KING_BLESS\n\
*Platform:* Telegram & console\n\
*AI Engine:* Pattern-based + Learning\n\
*Status:* Online & Learning 🟢\n\n\
_Built with ❤️ in Rust_";

pub const CHAT_MODE: &str = "🗣️ *AI Chat Mode Activated*\n\n\
Start chatting with me! I'll respond intelligently. Try asking me questions or just say hello!";

pub const HELP: &str = "❓ *HELP*\n\n\
Type *menu* to see all options\n\
Type any message to chat with AI\n\
I can understand context and learn from conversations!\n\n\
For issues, contact the bot administrator.";

pub const JOKES: &[&str] = &[
    "Why don't eggs tell jokes? They'd crack each other up! 🥚",
    "Why did the math book look so sad? Because it had too many problems! 📚",
    "What do you call a fake noodle? An impasta! 🍝",
    "Why did the coffee file a police report? It got mugged! ☕",
    "What do you call a bear with no teeth? A gummy bear! 🐻",
];

pub const JOKE_PREFIX: &str = "😄 *Joke of the moment:*\n\n";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuKind {
    #[default]
    Main,
    Features,
    Info,
}

impl MenuKind {
    /// Unknown names fall back to the main menu.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "features" => Self::Features,
            "info" => Self::Info,
            _ => Self::Main,
        }
    }
}

/// One entry of the selection dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Chat,
    Joke,
    Time,
    Date,
    Info,
    Help,
    Features,
}

impl Selection {
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "1" | "chat" => Self::Chat,
            "2" | "joke" => Self::Joke,
            "3" | "time" => Self::Time,
            "4" | "date" => Self::Date,
            "5" | "info" => Self::Info,
            "6" | "help" => Self::Help,
            "7" | "features" => Self::Features,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MenuRegistry;

impl MenuRegistry {
    pub fn get_menu(&self, kind: MenuKind) -> &'static str {
        match kind {
            MenuKind::Main => MAIN_MENU,
            MenuKind::Features => FEATURES_MENU,
            MenuKind::Info => INFO_MENU,
        }
    }

    /// Answer a menu token (`"2"`, `"joke"`, ...). Tokens are expected
    /// trimmed and lowercased; anything unknown yields `None`.
    pub fn process_selection(&self, token: &str, now: &DateTime<Local>) -> Option<String> {
        let reply = match Selection::parse(token)? {
            Selection::Chat => CHAT_MODE.to_string(),
            Selection::Joke => format!("{JOKE_PREFIX}{}", pick_str(JOKES)?),
            Selection::Time => format!("🕐 *Current Time:*\n\n{}", clock_time(now)),
            Selection::Date => format!("📅 *Today's Date:*\n\n{}", calendar_date(now)),
            Selection::Info => self.get_menu(MenuKind::Info).to_string(),
            Selection::Help => HELP.to_string(),
            Selection::Features => self.get_menu(MenuKind::Features).to_string(),
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 8, 15, 30).unwrap()
    }

    #[test]
    fn unknown_kind_falls_back_to_main() {
        let m = MenuRegistry;
        assert_eq!(m.get_menu(MenuKind::parse("nope")), MAIN_MENU);
        assert_eq!(m.get_menu(MenuKind::default()), MAIN_MENU);
        assert_eq!(m.get_menu(MenuKind::parse("Features")), FEATURES_MENU);
    }

    #[test]
    fn numbers_and_names_are_equivalent() {
        let m = MenuRegistry;
        for (num, name) in [("1", "chat"), ("5", "info"), ("6", "help"), ("7", "features")] {
            assert_eq!(
                m.process_selection(num, &at()),
                m.process_selection(name, &at())
            );
        }
    }

    #[test]
    fn joke_comes_from_the_joke_list() {
        let m = MenuRegistry;
        for token in ["2", "joke"] {
            let reply = m.process_selection(token, &at()).unwrap();
            let joke = reply.strip_prefix(JOKE_PREFIX).unwrap();
            assert!(JOKES.contains(&joke));
        }
    }

    #[test]
    fn time_and_date_use_the_given_clock() {
        let m = MenuRegistry;
        assert_eq!(
            m.process_selection("3", &at()).unwrap(),
            "🕐 *Current Time:*\n\n8:15:30 AM"
        );
        assert_eq!(
            m.process_selection("date", &at()).unwrap(),
            "📅 *Today's Date:*\n\nSun Oct 18 2026"
        );
    }

    #[test]
    fn info_page_names_the_supported_transports() {
        let info = MenuRegistry.process_selection("5", &at()).unwrap();
        assert_eq!(info, INFO_MENU);
        assert!(info.contains("*Platform:* Telegram & console"));
        assert!(!info.contains("WhatsApp"));
    }

    #[test]
    fn unknown_tokens_fall_through() {
        let m = MenuRegistry;
        assert!(m.process_selection("8", &at()).is_none());
        assert!(m.process_selection("hello", &at()).is_none());
        assert!(m.process_selection("", &at()).is_none());
    }
}
