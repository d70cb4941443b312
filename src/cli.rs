//! CLI argument parsing using clap.

use clap::{Parser, Subcommand};

use crate::config::RunOverrides;

/// Terminal client for a streaming deep-research agent.
///
/// Scout submits your question to a research engine, narrates its progress
/// (query generation, web research, reflection) as a live activity timeline,
/// and attaches the finished timeline to the answer it explains.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create .scout.toml with commented defaults
    Init,
    /// Ask a single question and stream the answer
    Ask {
        /// The research question
        #[arg(value_name = "QUESTION")]
        question: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Start an interactive chat session
    Chat {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Flags shared by `ask` and `chat`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Model for search query generation
    #[arg(long, value_name = "MODEL", env = "SCOUT_QUERY_MODEL")]
    pub query_model: Option<String>,

    /// Model for reflection between research loops
    #[arg(long, value_name = "MODEL", env = "SCOUT_REFLECTION_MODEL")]
    pub reflection_model: Option<String>,

    /// Model for composing the final answer
    #[arg(long, value_name = "MODEL", env = "SCOUT_ANSWER_MODEL")]
    pub answer_model: Option<String>,

    /// Number of search queries generated up front
    #[arg(long, value_name = "N")]
    pub initial_queries: Option<u32>,

    /// Maximum research loops before the engine must answer
    #[arg(long, value_name = "N")]
    pub max_loops: Option<u32>,

    /// Ask the models to expose their reasoning
    #[arg(long)]
    pub thinking: bool,

    /// Engine command to spawn
    #[arg(long, value_name = "CMD", env = "SCOUT_ENGINE")]
    pub engine: Option<String>,

    /// Tee raw engine output to a log file
    #[arg(long)]
    pub log: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            query_model: self.query_model.clone(),
            reflection_model: self.reflection_model.clone(),
            answer_model: self.answer_model.clone(),
            initial_queries: self.initial_queries,
            max_loops: self.max_loops,
            thinking: self.thinking,
        }
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
