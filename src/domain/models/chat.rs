use anyhow::Result;
use async_trait::async_trait;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: String,
}

/// A single update from the chat transport. Updates without a text message
/// still carry an id so polling can move past them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatUpdate {
    pub id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: &str) -> OutgoingMessage {
        return OutgoingMessage {
            chat_id,
            text: text.to_string(),
        };
    }
}

#[async_trait]
pub trait ChatTransport {
    /// Used at startup to verify the transport accepts our credentials.
    async fn health_check(&self) -> Result<()>;

    /// Long polls for updates newer than `offset`.
    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

pub type ChatTransportBox = Box<dyn ChatTransport + Send + Sync>;
