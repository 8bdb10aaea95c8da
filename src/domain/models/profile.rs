use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ProfileSource {
    /// Returns the slugs of every film the user rated five stars, in the order
    /// they appear on their profile. An empty list means nothing was found.
    async fn five_star_films(&self, username: &str) -> Result<Vec<String>>;
}

pub type ProfileSourceBox = Box<dyn ProfileSource + Send + Sync>;
