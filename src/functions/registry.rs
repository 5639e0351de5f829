use super::handler::{FunctionHandler, NowPlayingFunction, ReviewsFunction, ShowtimesFunction};
use super::{FunctionCall, FunctionName, MovieLookup};
use crate::core::error::{DispatchError, ReelError};
use std::collections::HashMap;
use std::sync::Arc;

pub struct FunctionRegistry {
    handlers: HashMap<FunctionName, Arc<dyn FunctionHandler>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the three movie functions backed by `lookup`.
    pub fn with_lookup(lookup: Arc<dyn MovieLookup>) -> Self {
        let mut registry = Self::new();
        registry.register(
            FunctionName::GetNowPlayingMovies,
            NowPlayingFunction::new(lookup.clone()),
        );
        registry.register(FunctionName::GetShowtimes, ShowtimesFunction::new(lookup.clone()));
        registry.register(FunctionName::GetReviews, ReviewsFunction::new(lookup));
        registry
    }

    pub fn register<H: FunctionHandler + 'static>(&mut self, name: FunctionName, handler: H) {
        self.handlers.insert(name, Arc::new(handler));
    }

    pub fn contains(&self, name: FunctionName) -> bool {
        self.handlers.contains_key(&name)
    }

    /// Registered function names in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        FunctionName::ALL
            .into_iter()
            .filter(|name| self.contains(*name))
            .map(|name| name.as_str())
            .collect()
    }

    /// Validates the required arguments, then runs the handler.
    pub async fn invoke(
        &self,
        name: FunctionName,
        call: &FunctionCall,
    ) -> Result<String, DispatchError> {
        let handler = self
            .handlers
            .get(&name)
            .ok_or_else(|| DispatchError::UnsupportedFunction(name.as_str().to_string()))?;

        let missing: Vec<&str> = handler
            .required_args()
            .iter()
            .copied()
            .filter(|arg| call.arg(arg).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::info!(function = name.as_str(), ?missing, "missing function arguments");
            return Err(DispatchError::Validation(
                handler.missing_args_prompt().to_string(),
            ));
        }

        handler
            .call(call)
            .await
            .map_err(|e| match e {
                ReelError::Lookup(reason) => DispatchError::Lookup(reason),
                other => DispatchError::Lookup(other.to_string()),
            })
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
