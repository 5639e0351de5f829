use super::{FragmentStream, LLMProvider, Message};
use crate::config::GenerationConfig;
use crate::core::error::ReelError;
use crate::providers::base_client::HttpClient;
use serde::Serialize;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Any endpoint speaking the OpenAI chat completions protocol.
#[derive(Clone)]
pub struct OpenAIProvider {
    client: HttpClient,
}

impl OpenAIProvider {
    pub fn with_endpoint(endpoint: String, api_key: Option<String>) -> Self {
        let api_key = api_key.unwrap_or_default();
        Self {
            client: HttpClient::new(endpoint, api_key),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

#[async_trait::async_trait]
impl LLMProvider for OpenAIProvider {
    async fn get_response_stream(
        &self,
        messages: &[Message],
        generation: &GenerationConfig,
    ) -> Result<FragmentStream, ReelError> {
        let payload = ChatCompletionRequest {
            model: &generation.model,
            messages,
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
            stream: true,
        };

        self.client
            .get_response_stream("chat/completions", &payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_generation_settings() {
        let messages = vec![Message::system("be brief"), Message::user("what's on?")];
        let generation = GenerationConfig::default();
        let payload = ChatCompletionRequest {
            model: &generation.model,
            messages: &messages,
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
            stream: true,
        };

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][1]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn endpoint_is_normalized() {
        let provider = OpenAIProvider::with_endpoint("http://localhost:1234/v1/".into(), None);
        assert_eq!(provider.endpoint(), "http://localhost:1234/v1");
    }
}
