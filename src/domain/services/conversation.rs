#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::replies;
use super::Roaster;
use crate::domain::models::ChatCommand;
use crate::domain::models::ConversationState;
use crate::domain::models::OutgoingMessage;
use crate::domain::models::ProfileSourceBox;
use crate::domain::models::RoastResult;
use crate::domain::models::Session;

fn reply(
    session: &Session,
    tx: &mpsc::UnboundedSender<OutgoingMessage>,
    text: &str,
) -> Result<()> {
    tx.send(OutgoingMessage::new(session.chat_id, text))?;
    return Ok(());
}

/// Drives a single chat through greeting, username collection, and roasting.
/// All chat output goes through `tx`, in the order the user should see it.
pub struct ConversationController {
    profiles: ProfileSourceBox,
    roaster: Roaster,
}

impl ConversationController {
    pub fn new(profiles: ProfileSourceBox, roaster: Roaster) -> ConversationController {
        return ConversationController { profiles, roaster };
    }

    pub async fn handle_message(
        &self,
        session: &mut Session,
        text: &str,
        tx: &mpsc::UnboundedSender<OutgoingMessage>,
    ) -> Result<()> {
        if let Some(command) = ChatCommand::parse(text) {
            if command.is_cancel() {
                session.end();
                reply(session, tx, replies::FAREWELL)?;
                return Ok(());
            }

            if command.is_start() {
                if session.state == ConversationState::AwaitingUsername {
                    tracing::debug!(chat_id = session.chat_id, "Ignoring /start mid conversation");
                    return Ok(());
                }

                session.await_username();
                reply(session, tx, replies::GREETING)?;
                return Ok(());
            }
        }

        if ChatCommand::is_command(text) {
            tracing::debug!(chat_id = session.chat_id, text, "Ignoring unknown command");
            return Ok(());
        }

        if session.state != ConversationState::AwaitingUsername {
            tracing::debug!(
                chat_id = session.chat_id,
                state = %session.state,
                "Ignoring message outside of a conversation"
            );
            return Ok(());
        }

        return self.handle_username(session, text, tx).await;
    }

    async fn handle_username(
        &self,
        session: &mut Session,
        text: &str,
        tx: &mpsc::UnboundedSender<OutgoingMessage>,
    ) -> Result<()> {
        let username = text.trim();
        if username.is_empty() {
            reply(session, tx, replies::EMPTY_USERNAME)?;
            return Ok(());
        }

        session.username = Some(username.to_string());
        reply(session, tx, &replies::searching(username))?;

        if let Err(err) = self.roast(session, tx).await {
            tracing::error!(chat_id = session.chat_id, username, error = ?err, "Failed to roast");
            session.await_username();
            reply(session, tx, &replies::error(&err))?;
        }

        return Ok(());
    }

    /// Roasts whoever the session last asked about.
    async fn roast(
        &self,
        session: &mut Session,
        tx: &mpsc::UnboundedSender<OutgoingMessage>,
    ) -> Result<()> {
        let username = match &session.username {
            Some(username) => username.to_string(),
            None => bail!("No username to roast"),
        };

        let films = self.profiles.five_star_films(&username).await?;
        if films.is_empty() {
            reply(session, tx, replies::NO_FILMS)?;
            return Ok(());
        }

        reply(session, tx, replies::ROASTING)?;

        match self.roaster.generate_roast(&username, &films).await {
            RoastResult::Success(text) => {
                reply(session, tx, &text)?;
                reply(session, tx, replies::ANOTHER_ONE)?;
                session.end();
            }
            RoastResult::Failure => {
                reply(session, tx, replies::ROAST_FAILED)?;
            }
        }

        return Ok(());
    }
}
