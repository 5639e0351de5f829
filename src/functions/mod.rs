pub mod catalog;
pub mod handler;
pub mod registry;

use crate::core::error::{DispatchError, ReelError};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;

pub use registry::FunctionRegistry;

/// The lookups a reply may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    GetNowPlayingMovies,
    GetShowtimes,
    GetReviews,
}

impl FunctionName {
    pub const ALL: [FunctionName; 3] = [
        FunctionName::GetNowPlayingMovies,
        FunctionName::GetShowtimes,
        FunctionName::GetReviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::GetNowPlayingMovies => "get_now_playing_movies",
            FunctionName::GetShowtimes => "get_showtimes",
            FunctionName::GetReviews => "get_reviews",
        }
    }
}

impl FromStr for FunctionName {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_now_playing_movies" => Ok(FunctionName::GetNowPlayingMovies),
            "get_showtimes" => Ok(FunctionName::GetShowtimes),
            "get_reviews" => Ok(FunctionName::GetReviews),
            other => Err(DispatchError::UnsupportedFunction(other.to_string())),
        }
    }
}

/// A function call as written by the model. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionCall {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub movie_id: Option<String>,
}

impl FunctionCall {
    /// Argument by field name, blank values treated as absent.
    pub fn arg(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => self.title.as_deref(),
            "location" => self.location.as_deref(),
            "movie_id" => self.movie_id.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Source of movie data behind the callable functions.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    async fn now_playing(&self) -> Result<String, ReelError>;

    async fn showtimes(&self, title: &str, location: &str) -> Result<String, ReelError>;

    /// Reviews for one movie, or for everything playing when `movie_id` is `None`.
    async fn reviews(&self, movie_id: Option<&str>) -> Result<String, ReelError>;
}
