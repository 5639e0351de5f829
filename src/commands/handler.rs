use super::ChatState;
use crate::core::error::ReelError;
use crate::display::format_history;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ReelError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct HistoryCommand;
pub struct ModelCommand;
pub struct FunctionsCommand;

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ReelError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, ReelError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            HistoryCommand.help().to_string(),
            ModelCommand.help().to_string(),
            FunctionsCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ReelError> {
        state.session.reset();
        Ok(Some("Chat history cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Start the conversation over"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ReelError> {
        let history = state.session.history();
        if history.is_empty() {
            return Ok(Some("No messages yet.".to_string()));
        }
        Ok(Some(format!(
            "{}\n{} messages",
            format_history(history.messages()),
            history.len()
        )))
    }

    fn help(&self) -> &'static str {
        "/history - Show the messages sent with each request"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ReelError> {
        match args.first() {
            None => Ok(Some(format!("Current model: {}", state.session.model()))),
            Some(model) => {
                state.session.set_model(model);
                Ok(Some(format!("Model changed to: {}", state.session.model())))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

impl CommandHandler for FunctionsCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ReelError> {
        Ok(Some(state.session.registry().names().join("\n")))
    }

    fn help(&self) -> &'static str {
        "/functions - List the lookups the assistant can call"
    }
}
