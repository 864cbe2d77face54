/// Core error type for the chat bot.
///
/// Adapter crates map their transport errors into this type so the gateway
/// can treat every failure the same way (log it, apologize once, move on).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid reply pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("logged out by the messaging service")]
    LoggedOut,
}

pub type Result<T> = std::result::Result<T, Error>;
