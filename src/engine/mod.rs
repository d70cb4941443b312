//! Engine integration: wire decoding, event classification, and process
//! streaming.
//!
//! The research engine is an external subprocess that accepts one JSON run
//! request on stdin and emits NDJSON lifecycle events on stdout. Everything
//! the rest of the client knows about that stream goes through this module.

pub mod classify;
pub mod client;
pub mod events;
pub mod parser;
