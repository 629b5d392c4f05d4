use teloxide::prelude::*;
use url::Url;

use crate::context::SharedContext;
use crate::dialogue::{ConversationState, FlowEvent, MyDialogue};
use crate::handlers::HandlerResult;
use crate::handlers::texts::{FALLBACK_GREETING, NOT_ADMIN, URL_NOT_TEXT, url_rejected_text, url_updated_text};
use crate::handlers::ui::main_menu;
use crate::model::UrlRejection;

enum UrlAnswer {
    NotAdmin,
    NotText,
    Rejected(UrlRejection),
    Accepted(Url),
}

/// Treats the message as the answer to the "set app URL" prompt.
pub async fn receive_webapp_url(
    bot: Bot,
    dialogue: MyDialogue,
    state: ConversationState,
    msg: Message,
    ctx: SharedContext,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let answer = {
        let mut ctx = ctx.lock().await;
        if !ctx.is_admin(user_id) {
            UrlAnswer::NotAdmin
        } else {
            match msg.text() {
                None => UrlAnswer::NotText,
                Some(text) => match ctx.set_webapp_url(text) {
                    Ok(url) => UrlAnswer::Accepted(url),
                    Err(rejection) => UrlAnswer::Rejected(rejection),
                },
            }
        }
    };

    match answer {
        UrlAnswer::NotAdmin => {
            dialogue.update(state.on(FlowEvent::Cancel)).await?;
            bot.send_message(msg.chat.id, NOT_ADMIN).await?;
        }
        UrlAnswer::NotText => {
            dialogue.update(state.on(FlowEvent::UrlRejected)).await?;
            bot.send_message(msg.chat.id, URL_NOT_TEXT).await?;
        }
        UrlAnswer::Rejected(rejection) => {
            dialogue.update(state.on(FlowEvent::UrlRejected)).await?;
            bot.send_message(msg.chat.id, rejection_text(&rejection)).await?;
        }
        UrlAnswer::Accepted(url) => {
            dialogue.update(state.on(FlowEvent::UrlAccepted)).await?;
            bot.send_message(msg.chat.id, url_updated_text(&url)).await?;
        }
    }

    Ok(())
}

pub fn rejection_text(rejection: &UrlRejection) -> String {
    match rejection {
        UrlRejection::MissingScheme => url_rejected_text().to_string(),
        UrlRejection::Unparsable(_) => format!("❌ {}", rejection),
    }
}

/// Anything that is not a command and not part of a flow.
pub async fn fallback_handler(bot: Bot, msg: Message, ctx: SharedContext) -> HandlerResult {
    let keyboard = {
        let ctx = ctx.lock().await;
        let is_admin = msg.from.as_ref().is_some_and(|u| ctx.is_admin(u.id.0 as i64));
        main_menu(ctx.webapp_url(), is_admin)
    };

    bot.send_message(msg.chat.id, FALLBACK_GREETING)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_text() {
        assert_eq!(rejection_text(&UrlRejection::MissingScheme), url_rejected_text());
        assert!(rejection_text(&UrlRejection::Unparsable("empty host".into())).contains("empty host"));
    }
}
