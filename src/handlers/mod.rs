pub mod admin;
pub mod admin_panel;
pub mod broadcast;
pub mod callback;
pub mod command;
pub mod text;
pub mod texts;
pub mod ui;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::User;

use crate::commands::Command;
use crate::context::SharedContext;
use crate::dialogue::{ConversationState, DialogueStorage, MyDialogue};

pub use broadcast::receive_broadcast_text;
pub use callback::callback_handler;
pub use command::command_handler;
pub use text::{fallback_handler, receive_webapp_url};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// The full update routing tree.
///
/// Commands always win. Otherwise the sender's conversation state decides
/// whether a message answers an admin flow or gets the generic reply.
///
/// State is keyed by the sender's id, so in a group only the admin who
/// opened a flow can answer it.
pub fn schema() -> UpdateHandler<HandlerError> {
    let message_handler = Update::filter_message()
        .inspect_async(track_message)
        .filter_map(message_dialogue)
        .filter_map_async(current_state)
        .branch(dptree::entry().filter_command::<Command>().endpoint(command_handler))
        .branch(dptree::case![ConversationState::AwaitingWebAppUrl].endpoint(receive_webapp_url))
        .branch(dptree::case![ConversationState::AwaitingBroadcastText].endpoint(receive_broadcast_text))
        .branch(dptree::endpoint(fallback_handler));

    let callback_query_handler = Update::filter_callback_query()
        .inspect_async(track_callback)
        .map(callback_dialogue)
        .filter_map_async(current_state)
        .endpoint(callback_handler);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_query_handler)
}

fn sender_dialogue(user: &User, storage: Arc<DialogueStorage>) -> MyDialogue {
    MyDialogue::new(storage, ChatId(user.id.0 as i64))
}

fn message_dialogue(msg: Message, storage: Arc<DialogueStorage>) -> Option<MyDialogue> {
    msg.from.as_ref().map(|user| sender_dialogue(user, storage))
}

fn callback_dialogue(q: CallbackQuery, storage: Arc<DialogueStorage>) -> MyDialogue {
    sender_dialogue(&q.from, storage)
}

async fn current_state(dialogue: MyDialogue) -> Option<ConversationState> {
    match dialogue.get_or_default().await {
        Ok(state) => Some(state),
        Err(e) => {
            log::error!("Failed to read conversation state of {}: {:?}", dialogue.chat_id(), e);
            None
        }
    }
}

async fn track_message(msg: Message, ctx: SharedContext) {
    if let Some(user) = msg.from.as_ref() {
        track(user, &ctx).await;
    }
}

async fn track_callback(q: CallbackQuery, ctx: SharedContext) {
    track(&q.from, &ctx).await;
}

async fn track(user: &User, ctx: &SharedContext) {
    ctx.lock()
        .await
        .record_activity(user.id.0 as i64, user.username.as_deref(), &user.first_name);
}
