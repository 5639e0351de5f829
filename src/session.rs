use crate::assembler::assemble;
use crate::config::GenerationConfig;
use crate::core::error::ReelError;
use crate::dispatch::{DispatchOutcome, dispatch};
use crate::display::OutputSink;
use crate::functions::FunctionRegistry;
use crate::history::MessageHistory;
use crate::providers::{LLMProvider, Message};
use std::sync::Arc;
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = r#"You are the helpful agent responsible for finding movies for users.
When a user asks about movies, answer with exactly one JSON object, and nothing else, in one of these formats.

1. When the user asks what's playing in movie theaters
{
    "function": "get_now_playing_movies",
    "rationale": "explain why you called this function"
}
2. When the user asks for showtimes of a specific movie
{
    "function": "get_showtimes",
    "title": "movie title",
    "location": "city or zip code",
    "rationale": "explain why you called this function"
}
3. When the user asks about reviews of a specific movie
{
    "function": "get_reviews",
    "movie_id": "id of the movie, as a string",
    "rationale": "explain why you called this function"
}

For anything else, reply in plain conversational text."#;

/// Shown when a turn fails before a complete reply arrives.
pub const PROVIDER_FAILURE: &str = "Sorry, I couldn't get a reply just now. Please try again.";

/// One user's conversation: its own history plus shared, read-only handles.
pub struct ConversationSession {
    history: MessageHistory,
    provider: Box<dyn LLMProvider>,
    registry: Arc<FunctionRegistry>,
    generation: GenerationConfig,
    timeout: Duration,
}

impl ConversationSession {
    pub fn new(
        provider: Box<dyn LLMProvider>,
        registry: Arc<FunctionRegistry>,
        generation: GenerationConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            history: MessageHistory::new(SYSTEM_PROMPT),
            provider,
            registry,
            generation,
            timeout,
        }
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn reset(&mut self) {
        self.history.reset();
    }

    pub fn model(&self) -> &str {
        &self.generation.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.generation.model = model.to_string();
    }

    /// Runs one turn: stream a reply to `text`, record it, then dispatch it.
    ///
    /// The user message and reply are committed together once the reply is
    /// complete. On provider failure or timeout history is left untouched,
    /// a generic failure is shown and the error is returned.
    pub async fn handle_message(
        &mut self,
        text: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<DispatchOutcome, ReelError> {
        let pending = Message::user(text);
        let request = self.history.with_pending(pending.clone());

        let reply = match self.complete(&request, sink).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(provider = e.is_provider_failure(), "turn failed: {}", e);
                sink.update();
                sink.send(PROVIDER_FAILURE);
                return Err(e);
            }
        };
        tracing::debug!(reply = %reply, "assembled reply");

        self.history.append(pending);
        self.history.append(Message::assistant(reply.clone()));

        Ok(dispatch(&reply, &self.registry, &mut self.history, sink).await)
    }

    async fn complete(
        &self,
        request: &[Message],
        sink: &mut dyn OutputSink,
    ) -> Result<String, ReelError> {
        let turn = async {
            let stream = self
                .provider
                .get_response_stream(request, &self.generation)
                .await?;
            assemble(stream, sink).await
        };

        tokio::time::timeout(self.timeout, turn)
            .await
            .map_err(|_| ReelError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DispatchError;
    use crate::functions::FunctionName;
    use crate::providers::Role;
    use crate::testing::{FakeLookup, RecordingSink, Script, ScriptedProvider};

    fn session(provider: &ScriptedProvider) -> ConversationSession {
        let registry = Arc::new(FunctionRegistry::with_lookup(Arc::new(FakeLookup::default())));
        ConversationSession::new(
            Box::new(provider.clone()),
            registry,
            GenerationConfig::default(),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn plain_turns_grow_history_by_two() {
        let provider = ScriptedProvider::default();
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        for n in 1..=3 {
            provider.push(Script::reply(&["Sure, ", "happy to help."]));
            let outcome = session.handle_message("hi", &mut sink).await.unwrap();
            assert_eq!(outcome, DispatchOutcome::PlainText);
            assert_eq!(session.history().len(), 1 + 2 * n);
        }

        let roles: Vec<Role> = session.history().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles[0], Role::System);
        assert!(roles[1..].chunks(2).all(|pair| pair == [Role::User, Role::Assistant]));
        assert_eq!(session.history().messages()[0].content, SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn request_includes_pending_user_message() {
        let provider = ScriptedProvider::new(vec![Script::reply(&["ok"])]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        session.handle_message("what's on?", &mut sink).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);
        assert_eq!(requests[0][1], Message::user("what's on?"));
    }

    #[tokio::test]
    async fn function_reply_appends_lookup_result() {
        let provider = ScriptedProvider::new(vec![Script::reply(&[
            r#"{"function":"get_showtimes","#,
            r#""title":"Dune","location":"94110"}"#,
        ])]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        let outcome = session.handle_message("Dune times in 94110?", &mut sink).await.unwrap();

        assert!(matches!(
            outcome,
            DispatchOutcome::Invoked { function: FunctionName::GetShowtimes, .. }
        ));
        assert_eq!(session.history().len(), 4);
        assert_eq!(
            session.history().messages().last(),
            Some(&Message::assistant("showtimes for Dune near 94110"))
        );
        assert_eq!(sink.sent(), vec!["Result: showtimes for Dune near 94110"]);
    }

    #[tokio::test]
    async fn provider_error_leaves_history_untouched() {
        let provider = ScriptedProvider::new(vec![
            Script::FailToStart(ReelError::Api("500 Internal Server Error".into())),
            Script::Fragments(vec![
                Ok("half a".into()),
                Err(ReelError::Network("reset".into())),
            ]),
            Script::reply(&["recovered"]),
        ]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        assert!(session.handle_message("one", &mut sink).await.is_err());
        assert!(session.handle_message("two", &mut sink).await.is_err());
        assert_eq!(session.history().len(), 1);
        assert_eq!(sink.sent(), vec![PROVIDER_FAILURE, PROVIDER_FAILURE]);

        session.handle_message("three", &mut sink).await.unwrap();
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history().messages()[1], Message::user("three"));
    }

    #[tokio::test]
    async fn slow_reply_times_out() {
        let provider = ScriptedProvider::new(vec![Script::Hang]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        let err = session.handle_message("hello?", &mut sink).await.unwrap_err();
        assert!(matches!(err, ReelError::Timeout(_)));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn malformed_call_keeps_the_raw_reply_only() {
        let provider = ScriptedProvider::new(vec![Script::reply(&[r#"{"function":"#])]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();

        let outcome = session.handle_message("hm", &mut sink).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Rejected(DispatchError::Parse(_))));
        assert_eq!(session.history().len(), 3);
        assert_eq!(sink.sent(), vec!["Invalid JSON format for function call."]);
    }

    #[tokio::test]
    async fn sessions_do_not_share_history() {
        let provider = ScriptedProvider::default();
        for _ in 0..3 {
            provider.push(Script::reply(&["hello"]));
        }
        let mut a = session(&provider);
        let mut b = session(&provider);

        let mut sink_a = RecordingSink::default();
        let mut sink_b = RecordingSink::default();
        let (ra, rb) = tokio::join!(
            a.handle_message("from a", &mut sink_a),
            b.handle_message("from b", &mut sink_b)
        );
        ra.unwrap();
        rb.unwrap();
        a.handle_message("again", &mut sink_a).await.unwrap();

        assert_eq!(a.history().len(), 5);
        assert_eq!(b.history().len(), 3);
        assert_eq!(b.history().messages()[1], Message::user("from b"));
    }

    #[tokio::test]
    async fn reset_and_model_switch() {
        let provider = ScriptedProvider::new(vec![Script::reply(&["hi"])]);
        let mut session = session(&provider);
        let mut sink = RecordingSink::default();
        session.handle_message("hello", &mut sink).await.unwrap();

        session.reset();
        assert_eq!(session.history().len(), 1);

        session.set_model("gpt-4o-mini");
        assert_eq!(session.model(), "gpt-4o-mini");
    }
}
