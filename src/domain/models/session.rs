#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingUsername,
    Ended,
}

/// State for a single chat. Nothing here outlives the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub chat_id: i64,
    pub state: ConversationState,
    pub username: Option<String>,
}

impl Session {
    pub fn new(chat_id: i64) -> Session {
        return Session {
            chat_id,
            state: ConversationState::Idle,
            username: None,
        };
    }

    pub fn await_username(&mut self) {
        self.state = ConversationState::AwaitingUsername;
        self.username = None;
    }

    pub fn end(&mut self) {
        self.state = ConversationState::Ended;
        self.username = None;
    }
}
