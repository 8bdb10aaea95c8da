use anyhow::Result;
use async_trait::async_trait;

use super::RoastPrompt;

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Called by `letterroast debug models` to provide all models on the
    /// backend that can generate content.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Requests a single, non streamed completion for the roast prompt. Any
    /// error is treated as a failed attempt by the caller.
    async fn get_completion(&self, prompt: &RoastPrompt) -> Result<String>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
