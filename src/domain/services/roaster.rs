#[cfg(test)]
#[path = "roaster_test.rs"]
mod tests;

use super::RetryPolicy;
use crate::domain::models::BackendBox;
use crate::domain::models::RoastPrompt;
use crate::domain::models::RoastResult;

pub struct Roaster {
    backend: BackendBox,
    retry: RetryPolicy,
}

impl Roaster {
    pub fn new(backend: BackendBox, retry: RetryPolicy) -> Roaster {
        return Roaster { backend, retry };
    }

    /// Asks the backend to roast the user's taste. `films` must not be empty,
    /// the caller checks that before getting here.
    pub async fn generate_roast(&self, username: &str, films: &[String]) -> RoastResult {
        let prompt = RoastPrompt::new(username, films);
        let prompt = &prompt;
        let backend = &self.backend;

        let res = self
            .retry
            .run(move |attempt| {
                tracing::debug!(username, attempt, "Requesting roast");
                return backend.get_completion(prompt);
            })
            .await;

        match res {
            Ok(text) => return RoastResult::Success(text),
            Err(err) => {
                tracing::error!(
                    username,
                    attempts = self.retry.max_attempts,
                    error = ?err,
                    "Failed to generate roast"
                );
                return RoastResult::Failure;
            }
        }
    }
}
