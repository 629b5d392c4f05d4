use std::str::FromStr;

use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardMarkup, ParseMode};

use crate::context::SharedContext;
use crate::dialogue::{ConversationState, MyDialogue};
use crate::handlers::HandlerResult;
use crate::handlers::admin_panel;
use crate::handlers::texts::{ACCESS_DENIED, menu_help_text, personal_stats_text, welcome_text};
use crate::handlers::ui::{MenuAction, home_menu, main_menu};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    state: ConversationState,
    ctx: SharedContext,
) -> HandlerResult {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    log::info!("Received callback query with data: {}", data);

    let Ok(action) = MenuAction::from_str(data) else {
        log::warn!("Unknown callback data {:?} from {}", data, q.from.id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    match action {
        MenuAction::Home => home(&bot, &q, &ctx).await,
        MenuAction::Stats => {
            let text = personal_stats_text(ctx.lock().await.registry().lookup(q.from.id.0 as i64));
            show_screen(&bot, &q, text, Some(home_menu())).await
        }
        MenuAction::Help => {
            let keyboard = user_menu(&q, &ctx).await;
            show_screen(&bot, &q, menu_help_text(), Some(keyboard)).await
        }
        MenuAction::AdminPanel => admin_panel::show_panel(&bot, &q, &ctx).await,
        MenuAction::AdminStats => admin_panel::show_stats(&bot, &q, &ctx).await,
        MenuAction::AdminUsers => admin_panel::show_users(&bot, &q, &ctx).await,
        MenuAction::AdminSettings => admin_panel::show_settings(&bot, &q, &ctx).await,
        MenuAction::AdminSetUrl => admin_panel::request_url(&bot, &q, &ctx, &dialogue, state).await,
        MenuAction::AdminBroadcast => {
            admin_panel::request_broadcast(&bot, &q, &ctx, &dialogue, state).await
        }
    }
}

async fn home(bot: &Bot, q: &CallbackQuery, ctx: &SharedContext) -> HandlerResult {
    let name = q.from.username.as_deref().unwrap_or(&q.from.first_name);
    let keyboard = user_menu(q, ctx).await;
    show_screen(bot, q, welcome_text(name), Some(keyboard)).await
}

async fn user_menu(q: &CallbackQuery, ctx: &SharedContext) -> InlineKeyboardMarkup {
    let ctx = ctx.lock().await;
    main_menu(ctx.webapp_url(), ctx.is_admin(q.from.id.0 as i64))
}

/// Answers an admin-only button pressed by someone else.
pub async fn deny(bot: &Bot, q: &CallbackQuery) -> HandlerResult {
    log::warn!("User {} pressed an admin-only button", q.from.id);
    bot.answer_callback_query(q.id.clone())
        .text(ACCESS_DENIED)
        .show_alert(true)
        .await?;
    Ok(())
}

/// Acknowledges the button and replaces the message it was attached to.
/// Falls back to a fresh message when the original is no longer accessible.
pub async fn show_screen(
    bot: &Bot,
    q: &CallbackQuery,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let text = text.into();
    let message = q.message.as_ref().and_then(|m| m.regular_message());

    match message {
        Some(message) => {
            let mut request = bot
                .edit_message_text(message.chat.id, message.id, text)
                .parse_mode(ParseMode::Html);
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(keyboard);
            }
            match request.await {
                Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        None => {
            let mut request = bot.send_message(q.from.id, text).parse_mode(ParseMode::Html);
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(keyboard);
            }
            request.await?;
        }
    }

    Ok(())
}
