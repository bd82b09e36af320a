use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use asistente::core::{Config, TimeKeeper};
use asistente::database::Database;
use asistente::features::assistant::Assistant;
use asistente::features::notify::{send_startup_greeting, TelegramNotifier};
use asistente::features::reminders::ReminderScheduler;

/// Owner id the interactive console acts as.
const CONSOLE_OWNER: &str = "usuario_principal";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting asistente backend...");
    info!("Timezone: {}", config.timezone);

    let keeper = TimeKeeper::new(config.timezone);

    let database = Arc::new(Database::connect(&config).await.map_err(|e| {
        error!("Database startup failed: {e}");
        error!("This could indicate:");
        error!("  - MONGODB_URL pointing at an unreachable cluster");
        error!("  - Wrong credentials in the connection string");
        anyhow::anyhow!("database startup failed: {}", e)
    })?);

    let notifier = Arc::new(TelegramNotifier::new(
        &config.telegram_bot_token,
        &config.telegram_chat_id,
    )?);

    // Boot-time delivery self test
    if send_startup_greeting(notifier.as_ref()).await {
        info!("📨 Telegram startup message delivered");
    } else {
        warn!("Telegram startup message failed - check bot token and chat id");
    }

    // Start the reminder scheduler
    let scheduler = ReminderScheduler::new(
        database.clone(),
        notifier.clone(),
        keeper,
        config.poll_seconds,
        config.backoff_seconds,
    );
    tokio::spawn(async move {
        scheduler.run().await;
    });

    let assistant = Assistant::new(database, keeper);

    // Interactive console in place of an HTTP surface: one request per line.
    println!("🤖 Asistente listo. Escribe una solicitud (Ctrl-D para salir).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let reply = assistant.respond(CONSOLE_OWNER, input).await;
        println!("{reply}\n");
    }

    info!("Console closed - shutting down");
    Ok(())
}
