use crate::cli::Args;
use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::core::error::ReelError;
use crate::display::{self, TerminalSink};
use crate::input;
use crate::session::ConversationSession;
use is_terminal::IsTerminal;
use std::io::{self, Read};

pub struct Application {
    pub args: Args,
    pub session: ConversationSession,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(
        args: Args,
        session: ConversationSession,
        command_dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            args,
            session,
            command_dispatcher,
        }
    }

    pub async fn run(self) -> Result<(), ReelError> {
        let piped = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ReelError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        match (self.args.query.clone(), piped) {
            (None, None) => self.handle_continuous_chat_mode().await,
            (query, piped) => {
                let query = one_shot_query(query, piped)?;
                self.handle_single_turn(&query).await
            }
        }
    }

    async fn handle_single_turn(mut self, query: &str) -> Result<(), ReelError> {
        let mut sink = TerminalSink::new();
        let outcome = self.session.handle_message(query, &mut sink).await?;
        tracing::debug!(?outcome, "turn finished");
        Ok(())
    }

    async fn handle_continuous_chat_mode(self) -> Result<(), ReelError> {
        let Application {
            session,
            command_dispatcher,
            ..
        } = self;

        display::display_welcome(session.model());

        let mut state = ChatState::new(session);
        let mut editor = input::create_editor(command_dispatcher.clone())?;
        let mut sink = TerminalSink::new();

        loop {
            let input = match input::read_input(&mut editor)? {
                Some(input) => input.trim().to_string(),
                None => break,
            };

            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match command_dispatcher.execute_line(&input, &mut state) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => display::display_error(&e.to_string()),
                }

                if !state.should_continue {
                    break;
                }
                continue;
            }

            // A failed turn is already reported through the sink; the session stays usable.
            match state.session.handle_message(&input, &mut sink).await {
                Ok(outcome) => tracing::debug!(?outcome, "turn finished"),
                Err(e) => tracing::debug!("continuing after failed turn: {}", e),
            }
        }

        input::save_history(&mut editor)?;

        Ok(())
    }
}

/// Combines the query argument with piped stdin.
fn one_shot_query(query: Option<String>, piped: Option<String>) -> Result<String, ReelError> {
    let piped = piped.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let query = match (query, piped) {
        (Some(q), Some(ctx)) => format!("{}\n\n{}", ctx, q),
        (Some(q), None) => q,
        (None, Some(ctx)) => ctx,
        (None, None) => String::new(),
    };

    if query.trim().is_empty() {
        return Err(ReelError::Input("No query provided".to_string()));
    }
    Ok(query)
}
