use crate::core::error::DispatchError;
use crate::display::OutputSink;
use crate::functions::{FunctionCall, FunctionName, FunctionRegistry};
use crate::history::MessageHistory;
use crate::providers::Message;

/// A finished reply, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    PlainText(String),
    Call(FunctionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Conversational text; nothing to run.
    PlainText,
    /// A lookup ran and its result was recorded.
    Invoked { function: FunctionName, result: String },
    /// The call was reported back to the user instead of run.
    Rejected(DispatchError),
}

/// Decides whether a reply is a function call.
///
/// Replies whose first non-blank character is `{` are treated as calls and
/// must parse as a `FunctionCall`; everything else is plain text.
pub fn classify(content: &str) -> Result<Reply, DispatchError> {
    if !content.trim_start().starts_with('{') {
        return Ok(Reply::PlainText(content.to_string()));
    }

    serde_json::from_str::<FunctionCall>(content.trim())
        .map(Reply::Call)
        .map_err(|e| DispatchError::Parse(e.to_string()))
}

/// Acts on a finished reply that is already recorded in `history`.
///
/// Lookup results are appended as assistant messages and shown as
/// `Result: ...`. Every failure is shown through `sink`; only an unsupported
/// function is also recorded in history.
pub async fn dispatch(
    content: &str,
    registry: &FunctionRegistry,
    history: &mut MessageHistory,
    sink: &mut dyn OutputSink,
) -> DispatchOutcome {
    let call = match classify(content) {
        Ok(Reply::PlainText(_)) => return DispatchOutcome::PlainText,
        Ok(Reply::Call(call)) => call,
        Err(e) => return reject(e, history, sink),
    };

    let name = match call.function.as_deref().unwrap_or_default().parse::<FunctionName>() {
        Ok(name) => name,
        Err(e) => return reject(e, history, sink),
    };

    tracing::info!(
        function = name.as_str(),
        rationale = call.rationale.as_deref().unwrap_or_default(),
        "dispatching function call"
    );

    match registry.invoke(name, &call).await {
        Ok(result) => {
            history.append(Message::assistant(result.clone()));
            sink.send(&format!("Result: {}", result));
            DispatchOutcome::Invoked {
                function: name,
                result,
            }
        }
        Err(e) => reject(e, history, sink),
    }
}

fn reject(
    err: DispatchError,
    history: &mut MessageHistory,
    sink: &mut dyn OutputSink,
) -> DispatchOutcome {
    tracing::warn!("function call rejected: {}", err);
    let text = err.user_message();
    if matches!(err, DispatchError::UnsupportedFunction(_)) {
        history.append(Message::assistant(text.clone()));
    }
    sink.send(&text);
    DispatchOutcome::Rejected(err)
}
