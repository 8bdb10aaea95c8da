use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::ChatTransport;
use crate::domain::models::ChatTransportBox;
use crate::domain::models::RoastResult;
use crate::domain::services::ConversationController;
use crate::domain::services::Dispatcher;
use crate::domain::services::RetryPolicy;
use crate::domain::services::Roaster;
use crate::infrastructure::backends::gemini::Gemini;
use crate::infrastructure::profiles::letterboxd::Letterboxd;
use crate::infrastructure::transports::telegram::Telegram;

/// Connects to Telegram and Gemini, then serves chats until the process is
/// stopped. Fails fast when either service rejects our configuration.
pub async fn start() -> Result<()> {
    let transport: ChatTransportBox = Box::<Telegram>::default();
    let backend: BackendBox = Box::<Gemini>::default();

    transport.health_check().await?;
    backend.health_check().await?;

    let controller = ConversationController::new(
        Box::<Letterboxd>::default(),
        Roaster::new(backend, RetryPolicy::from_config()?),
    );

    tracing::info!("Waiting for chat messages");
    return Dispatcher::start(Arc::new(transport), Arc::new(controller)).await;
}

/// Roasts a single user from the terminal, skipping the chat transport.
pub async fn roast(username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        bail!("Username must not be empty");
    }

    let films = Letterboxd::default().fetch_five_star_films(username).await;
    if films.is_empty() {
        bail!(format!("{username} has not rated any films five stars"));
    }

    let backend: BackendBox = Box::<Gemini>::default();
    let roaster = Roaster::new(backend, RetryPolicy::from_config()?);
    match roaster.generate_roast(username, &films).await {
        RoastResult::Success(text) => return Ok(text),
        RoastResult::Failure => bail!("Gemini failed to roast {username}, see logs for details"),
    }
}

pub async fn films(username: &str) -> Result<Vec<String>> {
    return Ok(Letterboxd::default()
        .fetch_five_star_films(username.trim())
        .await);
}

pub async fn models() -> Result<Vec<String>> {
    return Gemini::default().list_models().await;
}
