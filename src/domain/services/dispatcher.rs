#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dashmap::DashMap;
use tokio::sync::mpsc;

use super::ConversationController;
use crate::domain::models::ChatTransportBox;
use crate::domain::models::ConversationState;
use crate::domain::models::IncomingMessage;
use crate::domain::models::OutgoingMessage;
use crate::domain::models::Session;

const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

async fn deliver(
    transport: Arc<ChatTransportBox>,
    mut rx: mpsc::UnboundedReceiver<OutgoingMessage>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(err) = transport.send_message(msg.chat_id, &msg.text).await {
            tracing::error!(chat_id = msg.chat_id, error = ?err, "Failed to send message");
        }
    }
}

/// Routes chat messages to one worker per chat. A chat's messages are handled
/// strictly in order, while different chats run independently.
pub struct Dispatcher {
    controller: Arc<ConversationController>,
    workers: Arc<DashMap<i64, mpsc::UnboundedSender<String>>>,
    outbound: mpsc::UnboundedSender<OutgoingMessage>,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<ConversationController>,
        outbound: mpsc::UnboundedSender<OutgoingMessage>,
    ) -> Dispatcher {
        return Dispatcher {
            controller,
            workers: Arc::new(DashMap::new()),
            outbound,
        };
    }

    /// Workers own their chat's session and retire once the conversation has
    /// ended, so the next message for that chat starts from a fresh session.
    fn spawn_worker(&self, chat_id: i64) -> mpsc::UnboundedSender<String> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let controller = self.controller.clone();
        let outbound = self.outbound.clone();
        let workers = self.workers.clone();

        tokio::spawn(async move {
            let mut session = Session::new(chat_id);
            let mut next = rx.recv().await;

            while let Some(text) = next {
                let res = controller
                    .handle_message(&mut session, &text, &outbound)
                    .await;

                if let Err(err) = res {
                    tracing::error!(chat_id, error = ?err, "Chat worker stopped");
                    return;
                }

                if session.state != ConversationState::Ended {
                    next = rx.recv().await;
                    continue;
                }

                // Sends happen under the same shard lock, so an empty queue
                // here means nothing can be lost by retiring.
                let mut pending = None;
                workers.remove_if(&chat_id, |_, _| match rx.try_recv() {
                    Ok(text) => {
                        pending = Some(text);
                        return false;
                    }
                    Err(_) => return true,
                });

                if pending.is_none() {
                    tracing::debug!(chat_id, "Chat worker retired");
                }
                next = pending;
            }
        });

        return tx;
    }

    pub fn dispatch(&self, message: IncomingMessage) {
        let IncomingMessage { chat_id, text } = message;

        let mut worker = self
            .workers
            .entry(chat_id)
            .or_insert_with(|| return self.spawn_worker(chat_id));

        if let Err(err) = worker.send(text) {
            // The previous worker died, start the chat over with a fresh one.
            tracing::warn!(chat_id, "Restarting chat worker");
            let fresh = self.spawn_worker(chat_id);
            if fresh.send(err.0).is_ok() {
                *worker = fresh;
            }
        }
    }

    /// Long polls the transport forever, handing every text message to its
    /// chat's worker.
    pub async fn start(
        transport: Arc<ChatTransportBox>,
        controller: Arc<ConversationController>,
    ) -> Result<()> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<OutgoingMessage>();
        tokio::spawn(deliver(transport.clone(), outbound_rx));

        let dispatcher = Dispatcher::new(controller, outbound_tx);
        let mut offset = 0;

        loop {
            let updates = match transport.get_updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to get updates");
                    tokio::time::sleep(POLL_ERROR_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.id + 1);
                if let Some(message) = update.message {
                    tracing::debug!(update_id = update.id, chat_id = message.chat_id, "Received message");
                    dispatcher.dispatch(message);
                }
            }
        }
    }
}
