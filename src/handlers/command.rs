use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::commands::Command;
use crate::context::SharedContext;
use crate::dialogue::{ConversationState, FlowEvent, MyDialogue};
use crate::handlers::HandlerResult;
use crate::handlers::text::rejection_text;
use crate::handlers::texts::{
    CANCELLED, NOT_ADMIN, NOTHING_TO_CANCEL, SETWEBAPP_USAGE, admin_panel_text, help_text,
    url_set_text, welcome_text,
};
use crate::handlers::ui::{admin_menu, main_menu};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: MyDialogue,
    state: ConversationState,
    ctx: SharedContext,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let display_name = user.username.as_deref().unwrap_or(&user.first_name);

    match cmd {
        Command::Start => {
            let keyboard = {
                let ctx = ctx.lock().await;
                main_menu(ctx.webapp_url(), ctx.is_admin(user_id))
            };
            bot.send_message(msg.chat.id, welcome_text(display_name))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        Command::Help => {
            let keyboard = {
                let ctx = ctx.lock().await;
                main_menu(ctx.webapp_url(), ctx.is_admin(user_id))
            };
            bot.send_message(msg.chat.id, help_text())
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        Command::Cancel => {
            let reply = if state.is_idle() { NOTHING_TO_CANCEL } else { CANCELLED };
            dialogue.update(state.on(FlowEvent::Cancel)).await?;
            bot.send_message(msg.chat.id, reply).await?;
        }
        Command::Admin => {
            if !ctx.lock().await.is_admin(user_id) {
                log::warn!("User {} tried to open the admin panel", user_id);
                bot.send_message(msg.chat.id, NOT_ADMIN).await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, admin_panel_text())
                .parse_mode(ParseMode::Html)
                .reply_markup(admin_menu())
                .await?;
        }
        Command::SetWebApp(url) => {
            let reply = set_webapp_reply(&ctx, user_id, &url).await;
            bot.send_message(msg.chat.id, reply).await?;
        }
    }

    Ok(())
}

/// One-shot URL update. Does not touch the conversation state.
async fn set_webapp_reply(ctx: &SharedContext, user_id: i64, url: &str) -> String {
    let mut ctx = ctx.lock().await;

    if !ctx.is_admin(user_id) {
        log::warn!("User {} tried to change the app URL", user_id);
        return NOT_ADMIN.to_string();
    }
    if url.trim().is_empty() {
        return SETWEBAPP_USAGE.to_string();
    }

    match ctx.set_webapp_url(url) {
        Ok(url) => url_set_text(&url),
        Err(rejection) => rejection_text(&rejection),
    }
}
