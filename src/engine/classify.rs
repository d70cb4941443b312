//! Reduces normalized stream events into timeline activities.
//!
//! Each recognized stage has a fixed start form (announced when the stage
//! begins, before any output exists) and an end form summarizing its output.
//! Events that match no recognized stage yield nothing — the engine emits
//! plenty of lifecycle noise this client has no use for.

use serde_json::Value;

use super::events::{
    Activity, StreamEvent, TracePhase, FINALIZE_ANSWER, GENERATE_QUERY, REFLECTION, WEB_RESEARCH,
};

/// Distinct source labels surfaced in a web-research summary.
const MAX_RELATED_LABELS: usize = 3;

/// Classification result: the activity plus whether it marks the run
/// terminal. The classifier itself stays pure; the session state machine is
/// the one that acts on `terminal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub activity: Activity,
    pub terminal: bool,
}

/// Classify one normalized event into zero or one activity.
///
/// Total and non-throwing: unrecognized stages and malformed outputs degrade
/// to `None` or to summaries over empty collections, never to an error. The
/// same input always yields the same output.
pub fn classify(event: &StreamEvent) -> Option<Classified> {
    match event {
        StreamEvent::Traced {
            phase,
            name,
            output,
        } => match phase {
            TracePhase::ChainStart => start_activity(name),
            TracePhase::ChainEnd => output.as_ref().and_then(|out| end_activity(name, out)),
            TracePhase::Other => None,
        },
        // The flattened shape only surfaces completed stages, so everything
        // is treated as the end case — except the finalize stage, whose
        // single emission stands in for its start form and still terminates.
        StreamEvent::Flattened { node, output } => {
            if node == FINALIZE_ANSWER {
                start_activity(FINALIZE_ANSWER)
            } else {
                end_activity(node, output)
            }
        }
    }
}

/// Fixed announcement for a stage that just started.
fn start_activity(stage: &str) -> Option<Classified> {
    let (title, data, terminal) = match stage {
        GENERATE_QUERY => ("Generating Search Queries", "Creating search queries...", false),
        WEB_RESEARCH => ("Web Research", "Searching the web...", false),
        REFLECTION => ("Reflection", "Analyzing gathered information...", false),
        FINALIZE_ANSWER => (
            "Finalizing Answer",
            "Composing and presenting the final answer.",
            true,
        ),
        _ => return None,
    };
    Some(Classified {
        activity: Activity::new(title, data),
        terminal,
    })
}

/// Summary for a stage that just completed with the given output.
fn end_activity(stage: &str, output: &Value) -> Option<Classified> {
    let activity = match stage {
        GENERATE_QUERY => Activity::new(
            "Generating Search Queries",
            join_strings(output.get("search_query")),
        ),
        WEB_RESEARCH => Activity::new(
            "Web Research",
            summarize_sources(output.get("sources_gathered")),
        ),
        REFLECTION => Activity::new("Reflection", summarize_reflection(output)),
        // The finalize stage surfaces no end form.
        _ => return None,
    };
    Some(Classified {
        activity,
        terminal: false,
    })
}

/// Comma-join a JSON array of strings. Missing arrays and non-string
/// entries degrade to nothing.
fn join_strings(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// `"Gathered {N} sources. Related to: {labels}."`
///
/// N counts every gathered record; the labels are the first few distinct
/// non-empty ones, or `N/A` when no record carries a usable label.
fn summarize_sources(value: Option<&Value>) -> String {
    let empty = Vec::new();
    let sources = value.and_then(Value::as_array).unwrap_or(&empty);

    let mut labels: Vec<&str> = Vec::new();
    for source in sources {
        if labels.len() == MAX_RELATED_LABELS {
            break;
        }
        if let Some(label) = source.get("label").and_then(Value::as_str) {
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
    }

    let related = if labels.is_empty() {
        "N/A".to_string()
    } else {
        labels.join(", ")
    };
    format!("Gathered {} sources. Related to: {}.", sources.len(), related)
}

/// Either the search was sufficient, or name what we are still looking for.
fn summarize_reflection(output: &Value) -> String {
    let sufficient = output
        .get("is_sufficient")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if sufficient {
        "Search successful, generating final answer.".to_string()
    } else {
        let follow_ups = join_strings(output.get("follow_up_queries"));
        let target = if follow_ups.is_empty() {
            "additional info".to_string()
        } else {
            follow_ups
        };
        format!("Need more information, searching for {}.", target)
    }
}
