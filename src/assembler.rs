use crate::core::error::ReelError;
use crate::display::OutputSink;
use futures::{Stream, StreamExt};

/// Renders fragments as they arrive and returns the finished reply.
///
/// The result is the in-order concatenation of every non-empty fragment.
/// A stream error stops rendering and is returned; the partial text is dropped.
pub async fn assemble<S>(mut stream: S, sink: &mut dyn OutputSink) -> Result<String, ReelError>
where
    S: Stream<Item = Result<String, ReelError>> + Unpin,
{
    sink.send("");

    let mut full_response = String::new();
    while let Some(chunk_result) = stream.next().await {
        match chunk_result {
            Ok(chunk) => {
                if chunk.is_empty() {
                    continue;
                }
                tracing::trace!(len = chunk.len(), "fragment");
                sink.stream_token(&chunk);
                full_response.push_str(&chunk);
            }
            Err(e) => {
                sink.update();
                return Err(e);
            }
        }
    }

    sink.update();
    Ok(full_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, SinkEvent};
    use futures::stream;

    fn ok_stream(parts: &[&str]) -> impl Stream<Item = Result<String, ReelError>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(p.to_string()))
                .collect::<Vec<Result<String, ReelError>>>(),
        )
    }

    #[tokio::test]
    async fn concatenates_and_renders_each_fragment() {
        let mut sink = RecordingSink::default();
        let text = assemble(ok_stream(&["Now ", "", "playing", ": Dune"]), &mut sink)
            .await
            .unwrap();

        assert_eq!(text, "Now playing: Dune");
        assert_eq!(
            sink.events,
            vec![
                SinkEvent::Send(String::new()),
                SinkEvent::Token("Now ".into()),
                SinkEvent::Token("playing".into()),
                SinkEvent::Token(": Dune".into()),
                SinkEvent::Update,
            ]
        );
    }

    #[tokio::test]
    async fn chunk_boundaries_do_not_change_the_result() {
        let whole = r#"{"function":"get_showtimes","title":"Dune","location":"94110"}"#;
        for size in [1, 2, 3, 7, 16, whole.len()] {
            let parts: Vec<String> = whole
                .as_bytes()
                .chunks(size)
                .map(|c| String::from_utf8(c.to_vec()).unwrap())
                .collect();
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();

            let mut sink = RecordingSink::default();
            let text = assemble(ok_stream(&refs), &mut sink).await.unwrap();
            assert_eq!(text, whole, "chunk size {}", size);
        }
    }

    #[tokio::test]
    async fn empty_stream_gives_empty_reply() {
        let mut sink = RecordingSink::default();
        let text = assemble(ok_stream(&[]), &mut sink).await.unwrap();
        assert!(text.is_empty());
        assert_eq!(sink.events, vec![SinkEvent::Send(String::new()), SinkEvent::Update]);
    }

    #[tokio::test]
    async fn stream_error_is_returned() {
        let items: Vec<Result<String, ReelError>> = vec![
            Ok("partial".into()),
            Err(ReelError::Network("connection reset".into())),
            Ok("never seen".into()),
        ];
        let mut sink = RecordingSink::default();
        let result = assemble(stream::iter(items), &mut sink).await;

        assert!(matches!(result, Err(ReelError::Network(_))));
        assert!(!sink.tokens().contains("never seen"));
    }
}
