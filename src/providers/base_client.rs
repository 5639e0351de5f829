use crate::core::error::ReelError;
use crate::providers::FragmentStream;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send_request<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, ReelError> {
        let url = format!("{}/{}", self.endpoint, path);
        tracing::debug!(%url, "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReelError::Api(format!("{} returned {}: {}", url, status, body.trim())));
        }

        Ok(response)
    }

    /// Posts `payload` and decodes the server-sent event body into reply fragments.
    pub async fn get_response_stream<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<FragmentStream, ReelError> {
        let response = self.send_request(path, payload).await?;
        Ok(decode_fragments(
            response.bytes_stream().map(|item| item.map_err(ReelError::from)),
        ))
    }
}

/// Turns a server-sent event body into reply fragments, ending at `[DONE]`
/// or at the end of the body. A last line without a newline is still decoded.
pub fn decode_fragments<S, B>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<B, ReelError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let events = stream::unfold(
        (bytes.boxed(), Some(SseDecoder::default())),
        |(mut bytes, decoder)| async move {
            let mut decoder = decoder?;
            let events = match bytes.next().await {
                Some(Ok(chunk)) => decoder.feed(chunk.as_ref()),
                Some(Err(e)) => vec![Err(e)],
                None => return Some((decoder.finish(), (bytes, None))),
            };
            Some((events, (bytes, Some(decoder))))
        },
    );

    events
        .flat_map(stream::iter)
        .take_while(|event| future::ready(!matches!(event, Ok(SseEvent::Done))))
        .filter_map(|event| async move {
            match event {
                Ok(SseEvent::Fragment(text)) => Some(Ok(text)),
                Ok(SseEvent::Done) => None,
                Err(e) => Some(Err(e)),
            }
        })
        .boxed()
}

#[derive(Debug, PartialEq)]
pub enum SseEvent {
    Fragment(String),
    Done,
}

/// Splits a byte stream into `data:` lines, holding partial lines between chunks.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<SseEvent, ReelError>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim_end_matches(['\r', '\n'])) {
                events.push(event);
            }
        }
        events
    }

    /// Decodes whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<Result<SseEvent, ReelError>> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        parse_line(line.trim_end_matches(['\r', '\n'])).into_iter().collect()
    }
}

fn parse_line(line: &str) -> Option<Result<SseEvent, ReelError>> {
    let data = line.strip_prefix("data:")?.trim();
    if data == "[DONE]" {
        return Some(Ok(SseEvent::Done));
    }
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamResponse>(data) {
        Ok(parsed) => {
            if let Some(error) = parsed.error {
                return Some(Err(ReelError::Api(error.message)));
            }
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .map(|content| Ok(SseEvent::Fragment(content)))
        }
        Err(e) => Some(Err(ReelError::Api(format!("Malformed stream data: {}", e)))),
    }
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamError {
    message: String,
}
