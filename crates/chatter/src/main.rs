use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chatter_core::{
    bot::ChatBot,
    clock,
    config::{Config, TransportKind},
    errors::Error,
    gateway::Gateway,
    messaging::port::{MessagingPort, Transport},
};
use chatter_telegram::{TelegramMessenger, TelegramTransport};

mod console;

use console::{ConsoleMessenger, ConsoleTransport};

#[tokio::main]
async fn main() -> Result<(), Error> {
    chatter_core::logging::init("chatter")?;

    let cfg = Arc::new(Config::load()?);

    let transport: Arc<dyn Transport>;
    let messenger: Arc<dyn MessagingPort>;
    match cfg.transport {
        TransportKind::Telegram => {
            let token = cfg
                .telegram_bot_token
                .clone()
                .ok_or_else(|| Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;
            let bot = chatter_telegram::Bot::new(token);
            transport = Arc::new(TelegramTransport::new(bot.clone()));
            messenger = Arc::new(TelegramMessenger::new(bot));
        }
        TransportKind::Console => {
            transport = Arc::new(ConsoleTransport::stdin());
            messenger = Arc::new(ConsoleMessenger::stdout());
        }
    }

    chatter_core::gateway::bootstrap_directories(&cfg);
    let bot = ChatBot::from_config(&cfg, clock::system())?;
    info!(
        transport = ?cfg.transport,
        context = %cfg.context_file().display(),
        "starting chatter"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ctrl-c");
                return;
            }
            shutdown.cancel();
        });
    }

    let console = cfg.transport == TransportKind::Console;
    match Gateway::new(cfg, bot, messenger, shutdown)
        .run(transport)
        .await
    {
        // End of stdin.
        Err(Error::LoggedOut) if console => Ok(()),
        other => other,
    }
}
