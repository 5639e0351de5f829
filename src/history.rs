use crate::providers::{Message, Role};

/// Ordered conversation for one session. Index 0 is always the system prompt.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    messages: Vec<Message>,
}

impl MessageHistory {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Appends a user or assistant message. System messages are ignored so the
    /// prompt stays the only one, at the front.
    pub fn append(&mut self, message: Message) {
        if message.role == Role::System {
            tracing::warn!("refusing to append a second system message");
            return;
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// History followed by one message that has not been committed yet.
    pub fn with_pending(&self, message: Message) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(message);
        messages
    }

    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing but the system prompt is present.
    pub fn is_empty(&self) -> bool {
        self.messages.len() == 1
    }
}
