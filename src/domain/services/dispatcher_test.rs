use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::Dispatcher;
use crate::domain::models::Backend;
use crate::domain::models::ChatTransport;
use crate::domain::models::ChatTransportBox;
use crate::domain::models::ChatUpdate;
use crate::domain::models::IncomingMessage;
use crate::domain::models::OutgoingMessage;
use crate::domain::models::ProfileSource;
use crate::domain::models::RoastPrompt;
use crate::domain::services::replies;
use crate::domain::services::ConversationController;
use crate::domain::services::RetryPolicy;
use crate::domain::services::Roaster;

struct SlowProfiles {}

#[async_trait]
impl ProfileSource for SlowProfiles {
    #[allow(clippy::implicit_return)]
    async fn five_star_films(&self, username: &str) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        return Ok(vec![format!("{username}-favourite")]);
    }
}

struct EchoBackend {}

#[async_trait]
impl Backend for EchoBackend {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        return Ok(vec![]);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: &RoastPrompt) -> Result<String> {
        return Ok(format!("roasted {}", prompt.username));
    }
}

fn dispatcher() -> (Dispatcher, mpsc::UnboundedReceiver<OutgoingMessage>) {
    let controller = ConversationController::new(
        Box::new(SlowProfiles {}),
        Roaster::new(Box::new(EchoBackend {}), RetryPolicy::default()),
    );
    let (tx, rx) = mpsc::unbounded_channel::<OutgoingMessage>();

    return (Dispatcher::new(Arc::new(controller), tx), rx);
}

fn message(chat_id: i64, text: &str) -> IncomingMessage {
    return IncomingMessage {
        chat_id,
        text: text.to_string(),
    };
}

async fn recv_texts(
    rx: &mut mpsc::UnboundedReceiver<OutgoingMessage>,
    count: usize,
) -> Vec<OutgoingMessage> {
    let mut res = vec![];
    for _ in 0..count {
        res.push(rx.recv().await.unwrap());
    }

    return res;
}

#[tokio::test(start_paused = true)]
async fn it_keeps_chat_messages_in_order() {
    let (dispatcher, mut rx) = dispatcher();

    dispatcher.dispatch(message(1, "/start"));
    dispatcher.dispatch(message(1, "johndoe"));
    // Queued behind the roast, so it lands after the conversation ended.
    dispatcher.dispatch(message(1, "/cancel"));

    let res = recv_texts(&mut rx, 6).await;
    let texts = res
        .iter()
        .map(|msg| return msg.text.to_string())
        .collect::<Vec<String>>();

    assert!(res.iter().all(|msg| return msg.chat_id == 1));
    assert_eq!(
        texts,
        vec![
            replies::GREETING.to_string(),
            replies::searching("johndoe"),
            replies::ROASTING.to_string(),
            "roasted johndoe".to_string(),
            replies::ANOTHER_ONE.to_string(),
            replies::FAREWELL.to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn it_keeps_chats_independent() {
    let (dispatcher, mut rx) = dispatcher();

    dispatcher.dispatch(message(1, "/start"));
    dispatcher.dispatch(message(2, "/start"));
    dispatcher.dispatch(message(1, "johndoe"));
    dispatcher.dispatch(message(2, "janedoe"));

    let res = recv_texts(&mut rx, 10).await;

    let chat_texts = |chat_id: i64| {
        return res
            .iter()
            .filter(|msg| return msg.chat_id == chat_id)
            .map(|msg| return msg.text.to_string())
            .collect::<Vec<String>>();
    };

    assert_eq!(
        chat_texts(1),
        vec![
            replies::GREETING.to_string(),
            replies::searching("johndoe"),
            replies::ROASTING.to_string(),
            "roasted johndoe".to_string(),
            replies::ANOTHER_ONE.to_string(),
        ]
    );
    assert_eq!(
        chat_texts(2),
        vec![
            replies::GREETING.to_string(),
            replies::searching("janedoe"),
            replies::ROASTING.to_string(),
            "roasted janedoe".to_string(),
            replies::ANOTHER_ONE.to_string(),
        ]
    );
    // Both conversations ended, so neither chat keeps a worker around.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(dispatcher.workers.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn it_retires_workers_once_conversations_end() {
    let (dispatcher, mut rx) = dispatcher();

    for chat_id in 0..50 {
        dispatcher.dispatch(message(chat_id, "/cancel"));
    }
    let res = recv_texts(&mut rx, 50).await;
    assert!(res.iter().all(|msg| return msg.text == replies::FAREWELL));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(dispatcher.workers.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn it_keeps_workers_for_active_conversations() {
    let (dispatcher, mut rx) = dispatcher();

    dispatcher.dispatch(message(1, "/start"));
    dispatcher.dispatch(message(2, "/cancel"));
    recv_texts(&mut rx, 2).await;

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(dispatcher.workers.len(), 1);
    assert!(dispatcher.workers.contains_key(&1));
}

#[tokio::test(start_paused = true)]
async fn it_starts_fresh_sessions_after_retiring() {
    let (dispatcher, mut rx) = dispatcher();

    dispatcher.dispatch(message(1, "/cancel"));
    recv_texts(&mut rx, 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    dispatcher.dispatch(message(1, "/start"));
    dispatcher.dispatch(message(1, "johndoe"));

    let res = recv_texts(&mut rx, 5).await;
    let texts = res
        .iter()
        .map(|msg| return msg.text.to_string())
        .collect::<Vec<String>>();

    assert_eq!(
        texts,
        vec![
            replies::GREETING.to_string(),
            replies::searching("johndoe"),
            replies::ROASTING.to_string(),
            "roasted johndoe".to_string(),
            replies::ANOTHER_ONE.to_string(),
        ]
    );
}

struct FakeTransport {
    polls: Arc<Mutex<Vec<i64>>>,
    sent: mpsc::UnboundedSender<OutgoingMessage>,
}

#[async_trait]
impl ChatTransport for FakeTransport {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_updates(&self, offset: i64) -> Result<Vec<ChatUpdate>> {
        let poll = {
            let mut polls = self.polls.lock().unwrap();
            polls.push(offset);
            polls.len()
        };

        match poll {
            1 => bail!("telegram is down"),
            2 => {
                return Ok(vec![
                    ChatUpdate {
                        id: 5,
                        message: None,
                    },
                    ChatUpdate {
                        id: 6,
                        message: Some(message(1, "/start")),
                    },
                ]);
            }
            _ => {
                // Long poll that never sees anything new.
                tokio::time::sleep(Duration::from_secs(30)).await;
                return Ok(vec![]);
            }
        }
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.send(OutgoingMessage::new(chat_id, text))?;
        return Ok(());
    }
}

#[tokio::test(start_paused = true)]
async fn it_polls_past_failures_and_non_text_updates() {
    let polls = Arc::new(Mutex::new(vec![]));
    let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<OutgoingMessage>();
    let transport: ChatTransportBox = Box::new(FakeTransport {
        polls: polls.clone(),
        sent: sent_tx,
    });
    let controller = ConversationController::new(
        Box::new(SlowProfiles {}),
        Roaster::new(Box::new(EchoBackend {}), RetryPolicy::default()),
    );

    let started = Instant::now();
    let handle = tokio::spawn(Dispatcher::start(Arc::new(transport), Arc::new(controller)));

    let greeting = sent_rx.recv().await.unwrap();
    assert_eq!(greeting, OutgoingMessage::new(1, replies::GREETING));
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(*polls.lock().unwrap(), vec![0, 0, 7]);

    handle.abort();
}
