use anyhow::Error;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use teloxide::dptree;

use crate::commands::Command;
use crate::context::AppContext;
use crate::dialogue::DialogueStorage;

mod commands;
mod config;
mod context;
mod dialogue;
mod handlers;
mod model;
mod registry;
mod storage;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // --- Logging Setup ---
    use log::LevelFilter;
    use std::sync::{Arc, Mutex};
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::env;

    // 1. Get console log level from env
    let console_level_str = env::var("CONSOLE_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let console_level = match console_level_str.to_uppercase().as_str() {
        "ERROR" => LevelFilter::Error,
        _ => LevelFilter::Info, // Default to Info
    };

    // 2. Get file log level from env
    let file_level_str = env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "OFF".to_string());
    let file_level_config = match file_level_str.to_uppercase().as_str() {
        "ERROR" => Some(LevelFilter::Error),
        "ALL" | "INFO" => Some(LevelFilter::Info),
        _ => None, // OFF
    };

    // 3. The logger has to let through whatever either sink wants
    let max_level = std::cmp::max(
        console_level,
        file_level_config.unwrap_or(LevelFilter::Off)
    );

    // 4. Setup file handle if needed
    let log_file = if file_level_config.is_some() {
        let file = OpenOptions::new().create(true).append(true).open("bot.log")?;
        Some(Arc::new(Mutex::new(file)))
    } else {
        None
    };

    // 5. Build the logger
    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .filter(None, max_level)
        .format(move |buf, record| {
            let formatted_record = format!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );

            if record.level() <= console_level {
                writeln!(buf, "{}", formatted_record)?;
            }

            if let Some(file_level) = file_level_config {
                if record.level() <= file_level {
                    if let Some(file_handle) = &log_file {
                        if let Ok(mut guard) = file_handle.lock() {
                            let _ = writeln!(guard, "{}", formatted_record);
                        }
                    }
                }
            }
            Ok(())
        })
        .init();

    log::info!("Starting mini-app bot...");
    let start_time = std::time::Instant::now();

    let settings = match crate::config::load_environment() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load environment: {:#}", e);
            return Err(e);
        }
    };

    let ctx = AppContext::bootstrap(&settings);
    log::info!("Web app URL: {}", ctx.webapp_url());
    log::info!("Administrators configured: {}", ctx.admin_count());
    log::info!(
        "Stats loaded: {} users, {} messages since {}",
        ctx.stats().total_users,
        ctx.stats().messages_sent,
        ctx.stats().start_date.format("%Y-%m-%d")
    );
    let ctx = ctx.into_shared();

    let bot = Bot::new(settings.bot_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    log::info!("Bot initialization completed in {:.2?}", start_time.elapsed());
    log::info!("Starting to dispatch updates...");

    Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![ctx, DialogueStorage::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Bot shutdown complete");
    Ok(())
}
