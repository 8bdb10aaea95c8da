use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::Roaster;
use crate::domain::models::Backend;
use crate::domain::models::RoastPrompt;
use crate::domain::models::RoastResult;
use crate::domain::services::RetryPolicy;

/// Fails until `succeed_on` attempts have been made, recording every prompt.
struct FlakyBackend {
    succeed_on: Option<usize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Backend for FlakyBackend {
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
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.text.to_string());
        let attempt = prompts.len();

        if Some(attempt) == self.succeed_on {
            return Ok(format!("roast number {attempt}"));
        }

        bail!("backend unavailable on attempt {attempt}");
    }
}

fn roaster(succeed_on: Option<usize>) -> (Roaster, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(vec![]));
    let backend = FlakyBackend {
        succeed_on,
        prompts: prompts.clone(),
    };
    let retry = RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_secs(3),
    };

    return (Roaster::new(Box::new(backend), retry), prompts);
}

fn films() -> Vec<String> {
    return vec!["movie-a".to_string(), "movie-b".to_string()];
}

#[tokio::test(start_paused = true)]
async fn it_roasts_on_first_attempt() {
    let (roaster, prompts) = roaster(Some(1));
    let res = roaster.generate_roast("johndoe", &films()).await;

    assert_eq!(res, RoastResult::Success("roast number 1".to_string()));
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("(johndoe)"));
    assert!(prompts[0].contains("movie-a, movie-b"));
}

#[tokio::test(start_paused = true)]
async fn it_uses_the_third_attempt() {
    let (roaster, prompts) = roaster(Some(3));
    let res = roaster.generate_roast("johndoe", &films()).await;

    assert_eq!(res, RoastResult::Success("roast number 3".to_string()));
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    // Every attempt sends the same prompt.
    assert!(prompts.iter().all(|prompt| return prompt == &prompts[0]));
}

#[tokio::test(start_paused = true)]
async fn it_fails_after_three_attempts() {
    let (roaster, prompts) = roaster(None);
    let res = roaster.generate_roast("johndoe", &films()).await;

    assert_eq!(res, RoastResult::Failure);
    assert_eq!(prompts.lock().unwrap().len(), 3);
}
