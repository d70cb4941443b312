//! Session state machine: live timeline, terminal flag, history store,
//! archive reconciliation, and run submission.
//!
//! All per-run state is owned here and mutated only through the transition
//! operations below, one transport update at a time. The terminal flag in
//! particular cannot be set from outside; it flips when a terminal activity
//! is ingested and clears when the timeline is archived or a new run starts.

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::chat::{ChatMessage, Role};
use crate::config::RunConfig;
use crate::engine::classify::{self, Classified};
use crate::engine::events::{Activity, StreamEvent};

/// Outgoing request dispatched to the engine for one run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunRequest {
    pub messages: Vec<ChatMessage>,
    pub configurable: RunConfig,
}

/// Conversation state for one client process.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<ChatMessage>,
    /// Live timeline: activities for the run currently in flight.
    timeline: Vec<Activity>,
    /// True between a terminal activity and the subsequent archive or
    /// new submission.
    finalized: bool,
    /// Transport signal: a run is in flight.
    loading: bool,
    /// Archived timelines keyed by the agent message they explain.
    history: HashMap<String, Vec<Activity>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Read-only view of the live timeline, in arrival order.
    pub fn timeline(&self) -> &[Activity] {
        &self.timeline
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Archived timeline for a message id, if one was written.
    pub fn history_for(&self, id: &str) -> Option<&[Activity]> {
        self.history.get(id).map(Vec::as_slice)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Start a new run: clear per-run state, append the user's message, and
    /// build the request for the engine. The text must be non-empty after
    /// trimming; config fields are the caller's responsibility.
    pub fn submit(&mut self, text: &str, config: &RunConfig) -> Result<RunRequest> {
        let text = text.trim();
        if text.is_empty() {
            bail!("cannot submit an empty message");
        }

        self.timeline.clear();
        self.finalized = false;
        self.messages.push(ChatMessage::from_user(text));

        Ok(RunRequest {
            messages: self.messages.clone(),
            configurable: config.clone(),
        })
    }

    /// Ingest one normalized stream event. Recognized events append to the
    /// live timeline (duplicates and all — the timeline is a faithful log,
    /// not a deduplicated summary) and the terminal activity flips the
    /// terminal flag. Returns the appended activity for live rendering.
    pub fn ingest(&mut self, event: &StreamEvent) -> Option<Activity> {
        let Classified { activity, terminal } = classify::classify(event)?;
        self.timeline.push(activity.clone());
        if terminal {
            self.finalized = true;
            self.try_archive();
        }
        Some(activity)
    }

    /// Replace the transcript with the engine's latest view of it.
    pub fn replace_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.try_archive();
    }

    /// Transport signal: the run started or the stream went idle.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.try_archive();
    }

    /// Full client reset, equivalent to restarting the process. Used after
    /// cancellation: a partial timeline cannot be proven complete, so it is
    /// discarded rather than archived.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// Archive reconciliation, run after every transition of the message
    /// list, loading flag, or terminal flag.
    ///
    /// The engine never announces "run complete, here is the final message
    /// id". The terminal activity announces intent to finalize and
    /// loading=false announces the stream stopped; only both together, with
    /// an identifiable agent message at the tail of the transcript, make
    /// archiving safe. loading=false without the flag means the run failed
    /// or was cancelled, and nothing is archived. A satisfied flag with an
    /// unarchivable tail (user message, missing id, empty transcript) is
    /// left pending until a later transition resolves it.
    fn try_archive(&mut self) {
        if !self.finalized || self.loading {
            return;
        }
        let Some(last) = self.messages.last() else {
            return;
        };
        if last.role != Role::Agent {
            return;
        }
        let Some(id) = last.id.clone() else {
            return;
        };

        let archived = std::mem::take(&mut self.timeline);
        self.history.insert(id, archived);
        self.finalized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::{TracePhase, FINALIZE_ANSWER, WEB_RESEARCH};

    fn test_config() -> RunConfig {
        RunConfig {
            query_generator_model: "q-model".to_string(),
            reflection_model: "r-model".to_string(),
            answer_model: "a-model".to_string(),
            initial_search_query_count: 3,
            max_research_loops: 2,
            thinking: false,
        }
    }

    fn start_event(name: &str) -> StreamEvent {
        StreamEvent::Traced {
            phase: TracePhase::ChainStart,
            name: name.to_string(),
            output: None,
        }
    }

    fn agent_message(id: Option<&str>) -> ChatMessage {
        ChatMessage {
            id: id.map(String::from),
            role: Role::Agent,
            content: "the answer".to_string(),
        }
    }

    /// Drive a session to the brink of archiving: two activities ingested,
    /// terminal flag set, still loading.
    fn finalized_session() -> Session {
        let mut session = Session::new();
        session.submit("question", &test_config()).unwrap();
        session.set_loading(true);
        session.ingest(&start_event(WEB_RESEARCH));
        session.ingest(&start_event(FINALIZE_ANSWER));
        assert!(session.is_finalized());
        assert_eq!(session.timeline().len(), 2);
        session
    }

    #[test]
    fn submit_builds_request_with_user_message() {
        let mut session = Session::new();
        let request = session.submit("  what is rust?  ", &test_config()).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "what is rust?");
        assert_eq!(request.messages[0].role, Role::Human);
        assert!(request.messages[0].id.is_some());
        assert_eq!(request.configurable.initial_search_query_count, 3);
    }

    #[test]
    fn submit_rejects_blank_text() {
        let mut session = Session::new();
        assert!(session.submit("   ", &test_config()).is_err());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn submit_clears_timeline_and_flag_regardless_of_prior_state() {
        let mut session = finalized_session();
        session.submit("next question", &test_config()).unwrap();
        assert!(session.timeline().is_empty());
        assert!(!session.is_finalized());
    }

    #[test]
    fn ingest_appends_in_arrival_order_without_dedup() {
        let mut session = Session::new();
        session.ingest(&start_event(WEB_RESEARCH));
        session.ingest(&start_event(WEB_RESEARCH));
        assert_eq!(session.timeline().len(), 2);
        assert_eq!(session.timeline()[0], session.timeline()[1]);
    }

    #[test]
    fn ingest_ignores_unrecognized_events() {
        let mut session = Session::new();
        assert_eq!(session.ingest(&start_event("router")), None);
        assert!(session.timeline().is_empty());
        assert!(!session.is_finalized());
    }

    #[test]
    fn only_terminal_activity_sets_flag() {
        let mut session = Session::new();
        session.ingest(&start_event(WEB_RESEARCH));
        assert!(!session.is_finalized());
        session.ingest(&start_event(FINALIZE_ANSWER));
        assert!(session.is_finalized());
    }

    #[test]
    fn archive_moves_timeline_into_history() {
        let mut session = finalized_session();
        session.replace_messages(vec![agent_message(Some("m1"))]);
        session.set_loading(false);

        let archived = session.history_for("m1").expect("timeline archived");
        assert_eq!(archived.len(), 2);
        assert_eq!(archived[0].title, "Web Research");
        assert_eq!(archived[1].title, "Finalizing Answer");
        assert!(session.timeline().is_empty());
        assert!(!session.is_finalized());
    }

    #[test]
    fn archive_preserves_append_order() {
        let mut session = Session::new();
        session.set_loading(true);
        for name in ["generate_query", "web_research", "reflection", "finalize_answer"] {
            session.ingest(&start_event(name));
        }
        session.replace_messages(vec![agent_message(Some("m1"))]);
        session.set_loading(false);

        let titles: Vec<&str> = session
            .history_for("m1")
            .unwrap()
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(
            titles,
            ["Generating Search Queries", "Web Research", "Reflection", "Finalizing Answer"]
        );
    }

    #[test]
    fn archive_blocked_while_loading() {
        let mut session = finalized_session();
        session.replace_messages(vec![agent_message(Some("m1"))]);
        assert!(session.is_loading());
        assert_eq!(session.history_for("m1"), None);
        assert!(session.is_finalized());
    }

    #[test]
    fn archive_blocked_when_last_message_is_user() {
        let mut session = finalized_session();
        session.set_loading(false);
        // Only the submitted user message is present.
        assert_eq!(session.history_len(), 0);
        assert!(session.is_finalized());
        assert_eq!(session.timeline().len(), 2);
    }

    #[test]
    fn archive_blocked_on_empty_transcript() {
        let mut session = finalized_session();
        session.replace_messages(vec![]);
        session.set_loading(false);
        assert_eq!(session.history_len(), 0);
        assert!(session.is_finalized());
    }

    #[test]
    fn archive_blocked_when_agent_message_has_no_id() {
        let mut session = finalized_session();
        session.replace_messages(vec![agent_message(None)]);
        session.set_loading(false);
        assert_eq!(session.history_len(), 0);
        assert!(session.is_finalized());
    }

    #[test]
    fn pending_archive_resolves_on_late_transcript_update() {
        // Terminal activity and idle stream arrive before the final message
        // object exists; the archive happens once the transcript catches up.
        let mut session = finalized_session();
        session.set_loading(false);
        assert!(session.is_finalized());

        session.replace_messages(vec![agent_message(Some("m2"))]);
        assert!(!session.is_finalized());
        assert_eq!(session.history_for("m2").unwrap().len(), 2);
    }

    #[test]
    fn idle_without_terminal_archives_nothing() {
        let mut session = Session::new();
        session.submit("question", &test_config()).unwrap();
        session.set_loading(true);
        session.ingest(&start_event(WEB_RESEARCH));
        session.replace_messages(vec![agent_message(Some("m1"))]);
        session.set_loading(false);

        assert_eq!(session.history_len(), 0);
        assert_eq!(session.timeline().len(), 1);
    }

    #[test]
    fn timeline_drains_at_most_once_per_run() {
        let mut session = finalized_session();
        session.replace_messages(vec![agent_message(Some("m1"))]);
        session.set_loading(false);
        assert_eq!(session.history_for("m1").unwrap().len(), 2);

        // Later transitions must not re-archive an empty timeline elsewhere.
        session.replace_messages(vec![agent_message(Some("m9"))]);
        session.set_loading(false);
        assert_eq!(session.history_for("m9"), None);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn rearchiving_same_id_replaces_silently() {
        let mut session = finalized_session();
        session.replace_messages(vec![agent_message(Some("m1"))]);
        session.set_loading(false);
        assert_eq!(session.history_for("m1").unwrap().len(), 2);

        session.set_loading(true);
        session.ingest(&start_event(FINALIZE_ANSWER));
        session.set_loading(false);
        assert_eq!(session.history_for("m1").unwrap().len(), 1);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn reset_discards_everything() {
        let mut session = finalized_session();
        session.reset();
        assert!(session.timeline().is_empty());
        assert!(!session.is_finalized());
        assert!(!session.is_loading());
        assert!(session.messages().is_empty());
        assert_eq!(session.history_len(), 0);
    }
}
