//! Message admissibility filter.
//!
//! Run over the accumulated transcript before every model call. User and
//! tool-result messages are always model-consumable; assistant messages
//! are admitted only when they carry content or tool calls, which drops
//! exactly the degenerate empty responses malformed upstreams can produce.

use ragweed_core::error::TurnError;
use ragweed_core::message::Message;

/// Produce the subsequence of `messages` admissible as model input.
///
/// Fails with `TurnError::EmptyContext` when nothing is admissible —
/// calling the model with an empty transcript is a precondition violation
/// and the turn must abort instead.
pub fn admissible(messages: &[Message]) -> Result<Vec<Message>, TurnError> {
    let filtered: Vec<Message> = messages
        .iter()
        .filter(|m| match m {
            Message::User(_) | Message::ToolResult(_) => true,
            Message::Assistant(a) => !a.is_degenerate(),
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        return Err(TurnError::EmptyContext);
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragweed_core::message::ToolCall;

    #[test]
    fn user_and_tool_results_always_admitted() {
        let messages = vec![
            Message::user("question"),
            Message::tool_result(None, "web_search", "result", None),
        ];
        let filtered = admissible(&messages).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn degenerate_assistant_dropped() {
        let messages = vec![
            Message::user("question"),
            Message::assistant(""), // neither content nor tool calls
            Message::assistant("real answer"),
        ];
        let filtered = admissible(&messages).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(
            filtered
                .iter()
                .all(|m| m.as_assistant().is_none_or(|a| !a.is_degenerate()))
        );
    }

    #[test]
    fn assistant_with_tool_calls_admitted() {
        let messages = vec![
            Message::user("question"),
            Message::tool_request(vec![ToolCall::new("web_search", serde_json::Map::new())]),
        ];
        let filtered = admissible(&messages).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn empty_transcript_is_an_error() {
        let err = admissible(&[]).unwrap_err();
        assert!(matches!(err, TurnError::EmptyContext));
    }

    #[test]
    fn all_degenerate_is_an_error() {
        let messages = vec![Message::assistant(""), Message::assistant("")];
        let err = admissible(&messages).unwrap_err();
        assert!(matches!(err, TurnError::EmptyContext));
    }

    #[test]
    fn order_is_preserved() {
        let messages = vec![
            Message::user("one"),
            Message::assistant(""),
            Message::user("two"),
            Message::assistant("three"),
        ];
        let filtered = admissible(&messages).unwrap();
        let texts: Vec<&str> = filtered
            .iter()
            .map(|m| match m {
                Message::User(u) => u.content.as_str(),
                Message::Assistant(a) => a.content.as_str(),
                Message::ToolResult(r) => r.content.as_str(),
            })
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }
}
