use std::fmt::Display;
use std::future::Future;

use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::context::SharedContext;
use crate::dialogue::{ConversationState, FlowEvent, MyDialogue};
use crate::handlers::HandlerResult;
use crate::handlers::texts::{
    BROADCAST_FALLBACK, BROADCAST_STARTING, NOT_ADMIN, broadcast_report_text,
};

/// Anything that can push a text message to a user.
pub trait Outbox {
    type Error: Display;

    fn deliver(&self, recipient: i64, text: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl Outbox for Bot {
    type Error = RequestError;

    async fn deliver(&self, recipient: i64, text: &str) -> Result<(), RequestError> {
        self.send_message(ChatId(recipient), text).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// Sends `text` to every recipient in turn. A failed send is logged and
/// counted, and the loop carries on with the next recipient.
pub async fn broadcast<O: Outbox>(outbox: &O, recipients: &[i64], text: &str) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for &recipient in recipients {
        match outbox.deliver(recipient, text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                log::warn!("Failed to send broadcast to {}: {}", recipient, e);
                report.failed += 1;
                report.failures.push(DeliveryFailure {
                    recipient,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// Payload of a broadcast: the text, else the caption, else a fixed notice.
pub fn broadcast_payload(msg: &Message) -> String {
    msg.text()
        .or_else(|| msg.caption())
        .unwrap_or(BROADCAST_FALLBACK)
        .to_string()
}

pub async fn receive_broadcast_text(
    bot: Bot,
    dialogue: MyDialogue,
    state: ConversationState,
    msg: Message,
    ctx: SharedContext,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let admin_id = user.id.0 as i64;

    if !ctx.lock().await.is_admin(admin_id) {
        dialogue.update(state.on(FlowEvent::Cancel)).await?;
        bot.send_message(msg.chat.id, NOT_ADMIN).await?;
        return Ok(());
    }

    // Back to idle before anything can fail.
    dialogue.update(state.on(FlowEvent::BroadcastSent)).await?;

    let text = broadcast_payload(&msg);
    bot.send_message(msg.chat.id, BROADCAST_STARTING).await?;

    let recipients = ctx.lock().await.broadcast_recipients();
    log::info!("Admin {} started a broadcast to {} users", admin_id, recipients.len());

    let report = broadcast(&bot, &recipients, &text).await;
    log::info!(
        "Broadcast finished: {} delivered, {} failed",
        report.delivered,
        report.failed
    );

    bot.send_message(msg.chat.id, broadcast_report_text(&report)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeOutbox {
        failing: HashSet<i64>,
        attempts: Mutex<Vec<(i64, String)>>,
    }

    impl FakeOutbox {
        fn failing_for(ids: &[i64]) -> Self {
            Self {
                failing: ids.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn attempted(&self) -> Vec<i64> {
            self.attempts.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }
    }

    impl Outbox for FakeOutbox {
        type Error = String;

        async fn deliver(&self, recipient: i64, text: &str) -> Result<(), String> {
            self.attempts.lock().unwrap().push((recipient, text.to_string()));
            if self.failing.contains(&recipient) {
                Err(format!("chat {recipient} blocked the bot"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_broadcast_counts_failures_without_stopping() {
        let recipients: Vec<i64> = (1..=10).collect();
        let outbox = FakeOutbox::failing_for(&[1, 4, 10]);

        let report = broadcast(&outbox, &recipients, "X").await;

        assert_eq!((report.delivered, report.failed), (7, 3));
        assert_eq!(outbox.attempted(), recipients);
        let failed: Vec<i64> = report.failures.iter().map(|f| f.recipient).collect();
        assert_eq!(failed, vec![1, 4, 10]);
    }

    #[tokio::test]
    async fn test_broadcast_when_everything_fails() {
        let recipients = vec![5, 6];
        let outbox = FakeOutbox::failing_for(&[5, 6]);

        let report = broadcast(&outbox, &recipients, "X").await;

        assert_eq!((report.delivered, report.failed), (0, 2));
        assert_eq!(outbox.attempted(), recipients);
    }

    #[tokio::test]
    async fn test_broadcast_sends_the_same_text_to_everyone() {
        let outbox = FakeOutbox::default();

        let report = broadcast(&outbox, &[1, 2, 3], "hello all").await;

        assert_eq!(report.delivered, 3);
        assert!(report.failures.is_empty());
        assert!(outbox.attempts.lock().unwrap().iter().all(|(_, t)| t == "hello all"));
    }

    #[tokio::test]
    async fn test_broadcast_to_nobody() {
        let outbox = FakeOutbox::default();
        let report = broadcast(&outbox, &[], "X").await;
        assert_eq!(report, BroadcastReport::default());
    }
}
