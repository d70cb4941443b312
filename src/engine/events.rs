//! Event types for the engine's NDJSON lifecycle stream.

use serde_json::Value;

/// Pipeline stages the client surfaces on the activity timeline.
pub const GENERATE_QUERY: &str = "generate_query";
pub const WEB_RESEARCH: &str = "web_research";
pub const REFLECTION: &str = "reflection";
pub const FINALIZE_ANSWER: &str = "finalize_answer";

/// All recognized stage names, in pipeline order.
pub const STAGES: &[&str] = &[GENERATE_QUERY, WEB_RESEARCH, REFLECTION, FINALIZE_ANSWER];

/// One human-readable progress note derived from a stream event.
/// Immutable once created; only the classifier builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub title: String,
    pub data: String,
}

impl Activity {
    pub fn new(title: &str, data: impl Into<String>) -> Self {
        Activity {
            title: title.to_string(),
            data: data.into(),
        }
    }
}

/// Lifecycle phase declared by traced-form events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePhase {
    ChainStart,
    ChainEnd,
    /// Any other declared phase (tool calls, retries, heartbeats); ignored.
    Other,
}

/// Normalized stream event.
///
/// The engine speaks two incompatible wire shapes depending on the transport
/// it runs behind: a *traced* form that declares a lifecycle phase and stage
/// name explicitly, and a *flattened* form where a completed stage appears as
/// the single relevant key of the object. [`decode`] is the only place that
/// tells them apart; everything downstream works on this union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Traced {
        phase: TracePhase,
        name: String,
        output: Option<Value>,
    },
    Flattened {
        node: String,
        output: Value,
    },
}

/// Decode a wire object into a normalized event.
///
/// The traced shape is probed first: an object carrying an `event_type`
/// string and a `name` decodes as `Traced`, with `data.output` carried along
/// when present. Otherwise the object is probed for a single key naming a
/// known stage (`Flattened`). Anything matching neither shape decodes to
/// `None` and is dropped by the caller — that is not an error.
pub fn decode(raw: &Value) -> Option<StreamEvent> {
    let obj = raw.as_object()?;

    if let Some(kind) = obj.get("event_type").and_then(Value::as_str) {
        if let Some(name) = obj.get("name").and_then(Value::as_str) {
            let phase = match kind {
                "chain_start" => TracePhase::ChainStart,
                "chain_end" => TracePhase::ChainEnd,
                _ => TracePhase::Other,
            };
            let output = obj.get("data").and_then(|data| data.get("output")).cloned();
            return Some(StreamEvent::Traced {
                phase,
                name: name.to_string(),
                output,
            });
        }
        // Declared the traced shape but carries no stage name; fall through
        // to the flattened probe rather than failing.
    }

    for stage in STAGES {
        if let Some(output) = obj.get(*stage) {
            return Some(StreamEvent::Flattened {
                node: stage.to_string(),
                output: output.clone(),
            });
        }
    }

    None
}
