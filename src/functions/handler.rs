use super::{FunctionCall, MovieLookup};
use crate::core::error::ReelError;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait FunctionHandler: Send + Sync {
    /// Fields that must be present and non-blank before `call` runs.
    fn required_args(&self) -> &'static [&'static str] {
        &[]
    }

    /// Prompt shown when a required argument is missing.
    fn missing_args_prompt(&self) -> &'static str {
        "Please provide the required arguments for this function."
    }

    async fn call(&self, call: &FunctionCall) -> Result<String, ReelError>;
}

pub struct NowPlayingFunction {
    lookup: Arc<dyn MovieLookup>,
}

pub struct ShowtimesFunction {
    lookup: Arc<dyn MovieLookup>,
}

/// `movie_id` is optional: with it the reviews of that movie, without it the
/// reviews of everything playing.
pub struct ReviewsFunction {
    lookup: Arc<dyn MovieLookup>,
}

impl NowPlayingFunction {
    pub fn new(lookup: Arc<dyn MovieLookup>) -> Self {
        Self { lookup }
    }
}

impl ShowtimesFunction {
    pub fn new(lookup: Arc<dyn MovieLookup>) -> Self {
        Self { lookup }
    }
}

impl ReviewsFunction {
    pub fn new(lookup: Arc<dyn MovieLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl FunctionHandler for NowPlayingFunction {
    async fn call(&self, _call: &FunctionCall) -> Result<String, ReelError> {
        self.lookup.now_playing().await
    }
}

#[async_trait]
impl FunctionHandler for ShowtimesFunction {
    fn required_args(&self) -> &'static [&'static str] {
        &["title", "location"]
    }

    fn missing_args_prompt(&self) -> &'static str {
        "Please provide both title and location for showtimes."
    }

    async fn call(&self, call: &FunctionCall) -> Result<String, ReelError> {
        let title = call.arg("title").unwrap_or_default();
        let location = call.arg("location").unwrap_or_default();
        self.lookup.showtimes(title, location).await
    }
}

#[async_trait]
impl FunctionHandler for ReviewsFunction {
    async fn call(&self, call: &FunctionCall) -> Result<String, ReelError> {
        self.lookup.reviews(call.arg("movie_id")).await
    }
}
