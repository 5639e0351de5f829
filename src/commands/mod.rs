pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::session::ConversationSession;
pub use dispatcher::create_command_registry;

/// State the slash commands act on during an interactive chat.
pub struct ChatState {
    pub session: ConversationSession,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(session: ConversationSession) -> Self {
        Self {
            session,
            should_continue: true,
        }
    }
}
