#[cfg(test)]
#[path = "letterboxd_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use scraper::Html;
use scraper::Selector;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ProfileSource;

// Letterboxd turns away requests that don't look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FILM_SLUG_ATTR: &str = "data-film-slug";

/// Extracts every `data-film-slug` value from a rated films page, in document
/// order.
pub fn parse_film_slugs(html: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(&format!("[{FILM_SLUG_ATTR}]"))
        .map_err(|err| return anyhow!("Invalid film selector: {err:?}"))?;

    let document = Html::parse_document(html);
    let slugs = document
        .select(&selector)
        .filter_map(|element| return element.value().attr(FILM_SLUG_ATTR))
        .map(|slug| return slug.to_string())
        .collect::<Vec<String>>();

    return Ok(slugs);
}

pub struct Letterboxd {
    url: String,
}

impl Default for Letterboxd {
    fn default() -> Letterboxd {
        return Letterboxd {
            url: Config::get(ConfigKey::LetterboxdURL),
        };
    }
}

impl Letterboxd {
    fn rated_films_url(&self, username: &str) -> String {
        return format!(
            "{url}/{username}/films/rated/5/",
            url = self.url.trim_end_matches('/')
        );
    }

    async fn fetch_page(&self, username: &str) -> Result<String> {
        let body = reqwest::Client::new()
            .get(self.rated_films_url(username))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        return Ok(body);
    }

    /// Never fails. Network, status, and parse errors are logged and come back
    /// as an empty list, same as a profile without five star films.
    pub async fn fetch_five_star_films(&self, username: &str) -> Vec<String> {
        let res = match self.fetch_page(username).await {
            Ok(html) => parse_film_slugs(&html),
            Err(err) => Err(err),
        };

        let films = match res {
            Ok(films) => films,
            Err(err) => {
                tracing::error!(username, error = ?err, "Failed to fetch films from Letterboxd");
                return vec![];
            }
        };

        if films.is_empty() {
            tracing::warn!(username, "No five star films found on Letterboxd");
        }

        return films;
    }
}

#[async_trait]
impl ProfileSource for Letterboxd {
    #[allow(clippy::implicit_return)]
    async fn five_star_films(&self, username: &str) -> Result<Vec<String>> {
        return Ok(self.fetch_five_star_films(username).await);
    }
}
