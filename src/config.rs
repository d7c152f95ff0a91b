//! Runtime configuration for tac.
//!
//! Paths follow fixed conventions under the project root:
//! - `.claude/commands/` holds the stage command files
//! - `ai_docs/` receives pipeline output, including the goal file
//! - `tac.toml` (optional) carries assistant and builder overrides
//!
//! # Configuration File Format
//!
//! ```toml
//! [assistant]
//! command = "claude"
//!
//! [builder]
//! path = ".claude/commands/custom_build.md"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory holding the stage command files, relative to the project root.
pub const COMMANDS_DIR: &str = ".claude/commands";
/// Output directory for pipeline artifacts, relative to the project root.
pub const DOCS_DIR: &str = "ai_docs";
/// Goal file written when `--goal` is supplied, relative to `DOCS_DIR`.
pub const GOAL_FILE: &str = "tac_goal.md";
/// Map stage command file, relative to `COMMANDS_DIR`.
pub const MAP_COMMAND: &str = "map_prompts.md";
/// Plan stage command file, relative to `COMMANDS_DIR`.
pub const PLAN_COMMAND: &str = "plan_prompts.md";
/// Project configuration file, relative to the project root.
pub const CONFIG_FILE: &str = "tac.toml";

/// Builder command candidates, relative to `COMMANDS_DIR`, tried in order.
pub const BUILDER_CANDIDATES: [&str; 3] = [
    "build.md",
    "t_metaprompt_workflow.md",
    "experts/build/expert_build_workflow.md",
];

/// Runtime configuration for a single pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub commands_dir: PathBuf,
    pub docs_dir: PathBuf,
    /// Assistant executable tried before the built-in candidates.
    pub assistant: Option<String>,
    /// Builder command configured in tac.toml, beaten by `--builder`.
    pub builder_override: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    /// Build the configuration for a project root.
    ///
    /// `assistant` is the CLI override; it wins over `tac.toml` and the
    /// `TAC_ASSISTANT` environment variable.
    pub fn new(project_dir: PathBuf, assistant: Option<String>, verbose: bool) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let commands_dir = project_dir.join(COMMANDS_DIR);
        let docs_dir = project_dir.join(DOCS_DIR);

        let tac_toml = TacToml::load_or_default(&project_dir)?;
        let assistant = assistant.or_else(|| tac_toml.assistant_command());
        let builder_override = tac_toml.builder_path(&project_dir);

        Ok(Self {
            project_dir,
            commands_dir,
            docs_dir,
            assistant,
            builder_override,
            verbose,
        })
    }

    pub fn map_command(&self) -> PathBuf {
        self.commands_dir.join(MAP_COMMAND)
    }

    pub fn plan_command(&self) -> PathBuf {
        self.commands_dir.join(PLAN_COMMAND)
    }

    pub fn goal_file(&self) -> PathBuf {
        self.docs_dir.join(GOAL_FILE)
    }

    /// Builder candidate paths in priority order.
    pub fn builder_candidates(&self) -> Vec<PathBuf> {
        BUILDER_CANDIDATES
            .iter()
            .map(|name| self.commands_dir.join(name))
            .collect()
    }

    pub fn ensure_docs_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.docs_dir).context("Failed to create docs directory")?;
        Ok(())
    }
}

/// Assistant override section of `tac.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantSection {
    /// Assistant executable to try before the built-in candidates.
    #[serde(default)]
    pub command: Option<String>,
}

/// Builder override section of `tac.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuilderSection {
    /// Builder command file, absolute or relative to the project root.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// The complete tac.toml configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TacToml {
    #[serde(default)]
    pub assistant: AssistantSection,
    #[serde(default)]
    pub builder: BuilderSection,
}

impl TacToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse tac.toml")
    }

    /// Load configuration from the project root (tac.toml).
    /// Returns default configuration if the file doesn't exist.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the assistant override, with fallback to environment variable.
    pub fn assistant_command(&self) -> Option<String> {
        self.assistant
            .command
            .clone()
            .or_else(|| std::env::var("TAC_ASSISTANT").ok())
    }

    /// Get the builder override, absolutized against the project root.
    pub fn builder_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.builder.path.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                project_dir.join(path)
            }
        })
    }
}
