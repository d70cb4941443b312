//! NDJSON line parser for the engine's stdout stream.

use anyhow::Result;
use serde_json::Value;

use crate::chat::ChatMessage;

use super::events::{self, StreamEvent};

/// One update decoded from a single stdout line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireUpdate {
    /// Lifecycle event for the classifier.
    Event(StreamEvent),
    /// Full transcript replacement pushed by the engine.
    Messages(Vec<ChatMessage>),
}

/// Parse a single line of NDJSON into a transport update.
///
/// Blank lines and payloads matching no known shape yield `Ok(None)`; only
/// unparseable JSON is an error, and the caller treats that as stream noise.
pub fn parse_line(line: &str) -> Result<Option<WireUpdate>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let raw: Value = serde_json::from_str(line)?;

    if let Some(list) = raw.get("messages") {
        // A transcript update that fails to deserialize is dropped rather
        // than allowed to clobber the session's message list.
        return Ok(match serde_json::from_value(list.clone()) {
            Ok(messages) => Some(WireUpdate::Messages(messages)),
            Err(_) => None,
        });
    }

    Ok(events::decode(&raw).map(WireUpdate::Event))
}
