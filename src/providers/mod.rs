use crate::config::GenerationConfig;
use crate::core::error::ReelError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stream of reply fragments in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, ReelError>>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Starts a streaming completion over the whole conversation.
    async fn get_response_stream(
        &self,
        messages: &[Message],
        generation: &GenerationConfig,
    ) -> Result<FragmentStream, ReelError>;
}

pub mod base_client;
pub mod openai;
