//! In-memory stand-ins for the sink, the provider and the movie data.

use crate::config::GenerationConfig;
use crate::core::error::ReelError;
use crate::display::OutputSink;
use crate::functions::MovieLookup;
use crate::providers::{FragmentStream, LLMProvider, Message};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Send(String),
    Token(String),
    Update,
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Standalone messages, skipping the empty sends that open a stream.
    pub fn sent(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Send(text) if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tokens(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Token(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, text: &str) {
        self.events.push(SinkEvent::Send(text.to_string()));
    }

    fn stream_token(&mut self, token: &str) {
        self.events.push(SinkEvent::Token(token.to_string()));
    }

    fn update(&mut self) {
        self.events.push(SinkEvent::Update);
    }
}

#[derive(Default)]
pub struct FakeLookup {
    calls: Mutex<Vec<String>>,
    failure: Option<String>,
}

impl FakeLookup {
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: String, result: String) -> Result<String, ReelError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(reason) => Err(ReelError::Lookup(reason.clone())),
            None => Ok(result),
        }
    }
}

#[async_trait]
impl MovieLookup for FakeLookup {
    async fn now_playing(&self) -> Result<String, ReelError> {
        self.answer("now_playing()".into(), "now playing: Dune".into())
    }

    async fn showtimes(&self, title: &str, location: &str) -> Result<String, ReelError> {
        self.answer(
            format!("showtimes({}, {})", title, location),
            format!("showtimes for {} near {}", title, location),
        )
    }

    async fn reviews(&self, movie_id: Option<&str>) -> Result<String, ReelError> {
        self.answer(format!("reviews({:?})", movie_id), "reviews".into())
    }
}

/// What the scripted provider does for one request.
pub enum Script {
    Fragments(Vec<Result<String, ReelError>>),
    FailToStart(ReelError),
    Hang,
}

impl Script {
    pub fn reply(parts: &[&str]) -> Self {
        Script::Fragments(parts.iter().map(|p| Ok(p.to_string())).collect())
    }
}

/// Plays back queued scripts in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            requests: Arc::default(),
        }
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn get_response_stream(
        &self,
        messages: &[Message],
        _generation: &GenerationConfig,
    ) -> Result<FragmentStream, ReelError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::reply(&["(no script)"]));

        match script {
            Script::Fragments(items) => Ok(stream::iter(items).boxed()),
            Script::FailToStart(err) => Err(err),
            Script::Hang => Ok(stream::pending().boxed()),
        }
    }
}
