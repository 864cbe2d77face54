use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

const CONTEXT_FILE_NAME: &str = "memory.json";

/// Which messaging client drives the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Telegram,
    /// Local stdin/stdout loop, no network.
    Console,
}

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    pub transport: TransportKind,
    pub telegram_bot_token: Option<String>,
    pub bot_name: String,

    // Directories created at bootstrap
    pub auth_dir: PathBuf,
    pub chat_dir: PathBuf,
    pub context_dir: PathBuf,

    // Scheduling
    pub reconnect_delay: Duration,
    pub welcome_delay: Duration,

    /// Maximum number of learned entries kept; `None` keeps all of them.
    pub learned_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportKind::Telegram,
            telegram_bot_token: None,
            bot_name: "KING_BLESS".to_string(),
            auth_dir: PathBuf::from("./auth_info"),
            chat_dir: PathBuf::from("./chat_data"),
            context_dir: PathBuf::from("./ai_context"),
            reconnect_delay: Duration::from_millis(3000),
            welcome_delay: Duration::from_millis(1000),
            learned_limit: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).and_then(non_empty);

        let transport = match get("CHATTER_TRANSPORT")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("telegram") => TransportKind::Telegram,
            Some("console") => TransportKind::Console,
            Some(other) => {
                return Err(Error::Config(format!(
                    "unknown CHATTER_TRANSPORT `{other}` (expected telegram or console)"
                )))
            }
        };

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN");
        if transport == TransportKind::Telegram && telegram_bot_token.is_none() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let bot_name = get("CHATTER_BOT_NAME").unwrap_or(defaults.bot_name);

        let auth_dir = get("CHATTER_AUTH_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.auth_dir);
        let chat_dir = get("CHATTER_CHAT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.chat_dir);
        let context_dir = get("CHATTER_CONTEXT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.context_dir);

        let reconnect_delay = parse_u64(get("CHATTER_RECONNECT_DELAY_MS"))
            .map(Duration::from_millis)
            .unwrap_or(defaults.reconnect_delay);
        let welcome_delay = parse_u64(get("CHATTER_WELCOME_DELAY_MS"))
            .map(Duration::from_millis)
            .unwrap_or(defaults.welcome_delay);

        let learned_limit = parse_u64(get("CHATTER_LEARNED_LIMIT"))
            .map(|n| n as usize)
            .filter(|n| *n > 0);

        Ok(Self {
            transport,
            telegram_bot_token,
            bot_name,
            auth_dir,
            chat_dir,
            context_dir,
            reconnect_delay,
            welcome_delay,
            learned_limit,
        })
    }

    pub fn context_file(&self) -> PathBuf {
        self.context_dir.join(CONTEXT_FILE_NAME)
    }

    /// Directories that must exist before the transport connects.
    pub fn bootstrap_dirs(&self) -> [&Path; 3] {
        [&self.auth_dir, &self.chat_dir, &self.context_dir]
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
