//! Project configuration discovery and loading.
//!
//! A `.scout.toml` at or above the working directory supplies per-project
//! defaults for models, research depth, and the engine command. The file is
//! optional; without one, built-in defaults apply.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::{env, fs};

/// File name searched for when discovering project configuration.
pub const CONFIG_FILE: &str = ".scout.toml";

/// Contents of `.scout.toml`. Every field is optional; `config::resolve`
/// fills the gaps.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoutConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Per-stage model selections.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModelsConfig {
    pub query: Option<String>,
    pub reflection: Option<String>,
    pub answer: Option<String>,
}

/// Research depth knobs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResearchConfig {
    pub initial_queries: Option<u32>,
    pub max_loops: Option<u32>,
    pub thinking: Option<bool>,
}

/// Engine process settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    pub command: Option<String>,
}

/// Discover project configuration by walking up from CWD.
///
/// Searches for `.scout.toml` starting from the current directory and
/// walking up parent directories. A missing file is not an error — the
/// defaults apply; a present-but-unparseable file is.
pub fn discover() -> Result<ScoutConfig> {
    let cwd = env::current_dir()?;
    discover_from(&cwd)
}

fn discover_from(start: &Path) -> Result<ScoutConfig> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.is_file() {
            return load_config(&config_path);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Ok(ScoutConfig::default()),
        }
    }
}

/// Load and parse a `.scout.toml` file.
fn load_config(path: &Path) -> Result<ScoutConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ScoutConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Create `.scout.toml` with commented defaults in the current directory.
///
/// Idempotent: an existing file is left untouched.
pub fn init() -> Result<()> {
    let cwd = env::current_dir()?;
    init_in_dir(&cwd)
}

fn init_in_dir(cwd: &Path) -> Result<()> {
    let config_path = cwd.join(CONFIG_FILE);
    if config_path.exists() {
        println!("{} already exists, skipping.", CONFIG_FILE);
        return Ok(());
    }

    let default_config = r#"[models]
# query = "gemini-2.5-flash"
# reflection = "gemini-2.5-flash"
# answer = "gemini-2.5-pro"

[research]
# initial_queries = 3
# max_loops = 2
# thinking = false

[engine]
# command = "scout-engine"
"#;
    fs::write(&config_path, default_config)
        .with_context(|| format!("Failed to create {}", CONFIG_FILE))?;
    println!("Created {}", CONFIG_FILE);
    Ok(())
}
