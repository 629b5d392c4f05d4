use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

pub type DialogueStorage = InMemStorage<ConversationState>;
pub type MyDialogue = Dialogue<ConversationState, DialogueStorage>;

/// Whether the next free-text message from a user answers an admin flow.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingWebAppUrl,
    AwaitingBroadcastText,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    RequestUrlUpdate,
    RequestBroadcast,
    UrlRejected,
    UrlAccepted,
    BroadcastSent,
    Cancel,
}

impl ConversationState {
    pub fn on(self, event: FlowEvent) -> Self {
        use ConversationState::*;
        use FlowEvent::*;

        match (self, event) {
            (_, Cancel) => Idle,
            (_, RequestUrlUpdate) => AwaitingWebAppUrl,
            (_, RequestBroadcast) => AwaitingBroadcastText,
            (AwaitingWebAppUrl, UrlRejected) => AwaitingWebAppUrl,
            (AwaitingWebAppUrl, UrlAccepted) => Idle,
            (AwaitingBroadcastText, BroadcastSent) => Idle,
            (state, _) => state,
        }
    }

    pub fn is_idle(self) -> bool {
        self == ConversationState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::ConversationState::*;
    use super::FlowEvent::*;

    #[test]
    fn test_url_flow() {
        let state = Idle.on(RequestUrlUpdate);
        assert_eq!(state, AwaitingWebAppUrl);

        let state = state.on(UrlRejected);
        assert_eq!(state, AwaitingWebAppUrl);
        let state = state.on(UrlRejected);
        assert_eq!(state, AwaitingWebAppUrl);

        assert_eq!(state.on(UrlAccepted), Idle);
    }

    #[test]
    fn test_broadcast_flow() {
        let state = Idle.on(RequestBroadcast);
        assert_eq!(state, AwaitingBroadcastText);
        assert_eq!(state.on(BroadcastSent), Idle);
    }

    #[test]
    fn test_cancel_from_anywhere() {
        for state in [Idle, AwaitingWebAppUrl, AwaitingBroadcastText] {
            assert!(state.on(Cancel).is_idle());
        }
    }

    #[test]
    fn test_entering_a_flow_replaces_the_other() {
        assert_eq!(AwaitingWebAppUrl.on(RequestBroadcast), AwaitingBroadcastText);
        assert_eq!(AwaitingBroadcastText.on(RequestUrlUpdate), AwaitingWebAppUrl);
    }

    #[test]
    fn test_unrelated_events_leave_state_alone() {
        assert_eq!(Idle.on(UrlAccepted), Idle);
        assert_eq!(Idle.on(BroadcastSent), Idle);
        assert_eq!(AwaitingBroadcastText.on(UrlAccepted), AwaitingBroadcastText);
        assert_eq!(AwaitingWebAppUrl.on(BroadcastSent), AwaitingWebAppUrl);
    }
}
