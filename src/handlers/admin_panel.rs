use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use crate::context::SharedContext;
use crate::dialogue::{ConversationState, FlowEvent, MyDialogue};
use crate::handlers::HandlerResult;
use crate::handlers::callback::{deny, show_screen};
use crate::handlers::texts::{
    BROADCAST_PROMPT, URL_PROMPT, admin_panel_text, admin_stats_text, settings_text,
    users_list_text,
};
use crate::handlers::ui::admin_menu;

async fn is_admin(q: &CallbackQuery, ctx: &SharedContext) -> bool {
    ctx.lock().await.is_admin(q.from.id.0 as i64)
}

pub async fn show_panel(bot: &Bot, q: &CallbackQuery, ctx: &SharedContext) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }
    show_screen(bot, q, admin_panel_text(), Some(admin_menu())).await
}

pub async fn show_stats(bot: &Bot, q: &CallbackQuery, ctx: &SharedContext) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }

    let text = {
        let ctx = ctx.lock().await;
        admin_stats_text(ctx.stats(), ctx.active_users(), ctx.webapp_url())
    };
    show_screen(bot, q, text, Some(admin_menu())).await
}

pub async fn show_users(bot: &Bot, q: &CallbackQuery, ctx: &SharedContext) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }

    let text = users_list_text(ctx.lock().await.registry());
    show_screen(bot, q, text, Some(admin_menu())).await
}

pub async fn show_settings(bot: &Bot, q: &CallbackQuery, ctx: &SharedContext) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }

    let text = {
        let ctx = ctx.lock().await;
        settings_text(ctx.webapp_url(), ctx.admin_count(), ctx.stats().total_users)
    };
    show_screen(bot, q, text, Some(admin_menu())).await
}

pub async fn request_url(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &SharedContext,
    dialogue: &MyDialogue,
    state: ConversationState,
) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }

    dialogue.update(state.on(FlowEvent::RequestUrlUpdate)).await?;
    show_screen(bot, q, URL_PROMPT, None).await
}

pub async fn request_broadcast(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &SharedContext,
    dialogue: &MyDialogue,
    state: ConversationState,
) -> HandlerResult {
    if !is_admin(q, ctx).await {
        return deny(bot, q).await;
    }

    dialogue.update(state.on(FlowEvent::RequestBroadcast)).await?;
    show_screen(bot, q, BROADCAST_PROMPT, None).await
}
