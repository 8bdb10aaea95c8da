#[cfg(test)]
#[path = "chat_command_test.rs"]
mod tests;

pub struct ChatCommand {
    command: String,
}

impl ChatCommand {
    /// Returns true for anything shaped like a bot command, known or not.
    pub fn is_command(text: &str) -> bool {
        return text.trim_start().starts_with('/');
    }

    pub fn parse(text: &str) -> Option<ChatCommand> {
        if !ChatCommand::is_command(text) {
            return None;
        }

        // Anything after the command, like a /start deep link payload, is
        // ignored.
        let prefix = text.split_whitespace().next().unwrap_or_default();

        // Group chats address commands as /start@SomeBot.
        let command = prefix.split('@').next().unwrap_or_default().to_lowercase();

        let cmd = ChatCommand { command };
        if cmd.is_start() || cmd.is_cancel() {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_start(&self) -> bool {
        return self.command == "/start";
    }

    pub fn is_cancel(&self) -> bool {
        return self.command == "/cancel";
    }
}
