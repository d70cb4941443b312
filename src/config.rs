//! Run configuration: defaults, `.scout.toml` values, and CLI overrides.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::project::ScoutConfig;

/// Defaults when neither the CLI nor `.scout.toml` says otherwise.
pub const DEFAULT_QUERY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REFLECTION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ANSWER_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_INITIAL_QUERIES: u32 = 3;
pub const DEFAULT_MAX_LOOPS: u32 = 2;

/// Engine spawned when no command is configured.
pub const DEFAULT_ENGINE: &str = "scout-engine";

/// Per-run settings dispatched to the engine alongside the transcript.
///
/// Field names are the engine's wire names. Model names are free-form
/// strings; whether the engine knows them is its problem, not ours.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub query_generator_model: String,
    pub reflection_model: String,
    pub answer_model: String,
    pub initial_search_query_count: u32,
    pub max_research_loops: u32,
    pub thinking: bool,
}

/// CLI-facing knobs. `None` falls through to `.scout.toml`, then defaults.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub query_model: Option<String>,
    pub reflection_model: Option<String>,
    pub answer_model: Option<String>,
    pub initial_queries: Option<u32>,
    pub max_loops: Option<u32>,
    pub thinking: bool,
}

impl RunConfig {
    /// Layer CLI overrides over the project config over defaults, then
    /// validate the counts. Zero queries or zero loops would ask the engine
    /// to research nothing, so both bail here rather than downstream.
    pub fn resolve(overrides: &RunOverrides, file: &ScoutConfig) -> Result<Self> {
        let config = RunConfig {
            query_generator_model: pick(
                &overrides.query_model,
                &file.models.query,
                DEFAULT_QUERY_MODEL,
            ),
            reflection_model: pick(
                &overrides.reflection_model,
                &file.models.reflection,
                DEFAULT_REFLECTION_MODEL,
            ),
            answer_model: pick(
                &overrides.answer_model,
                &file.models.answer,
                DEFAULT_ANSWER_MODEL,
            ),
            initial_search_query_count: overrides
                .initial_queries
                .or(file.research.initial_queries)
                .unwrap_or(DEFAULT_INITIAL_QUERIES),
            max_research_loops: overrides
                .max_loops
                .or(file.research.max_loops)
                .unwrap_or(DEFAULT_MAX_LOOPS),
            thinking: overrides.thinking || file.research.thinking.unwrap_or(false),
        };

        if config.initial_search_query_count == 0 {
            bail!("initial query count must be at least 1");
        }
        if config.max_research_loops == 0 {
            bail!("research loop budget must be at least 1");
        }

        Ok(config)
    }
}

/// Resolve the engine command: CLI flag (or `SCOUT_ENGINE` env, handled by
/// clap) wins over `.scout.toml` wins over the default.
pub fn resolve_engine(flag: &Option<String>, file: &ScoutConfig) -> String {
    pick(flag, &file.engine.command, DEFAULT_ENGINE)
}

fn pick(flag: &Option<String>, file: &Option<String>, default: &str) -> String {
    flag.clone()
        .or_else(|| file.clone())
        .unwrap_or_else(|| default.to_string())
}
