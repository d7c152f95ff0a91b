//! The map → plan → build pipeline.
//!
//! Stages run in fixed order, each blocking until its subprocess exits.
//! Map and Plan abort the run when their command file is missing or their
//! invocation fails; Build is resolved from an override or the candidate
//! list and skipped with a warning when nothing resolves.

use anyhow::Context;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BUILDER_CANDIDATES, Config};
use crate::dispatch;
use crate::errors::PipelineError;
use crate::stage::Stage;

/// Per-run options collected from the CLI.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Goal text persisted to the goal file before the stages run.
    pub goal: Option<String>,
    /// Report intended actions without invoking the assistant.
    pub dry_run: bool,
    /// Builder command override (used as given, no existence check).
    pub builder: Option<PathBuf>,
}

/// Execute the pipeline: map, then plan, then build.
pub fn run(config: &Config, options: &RunOptions) -> Result<(), PipelineError> {
    config.ensure_docs_dir()?;

    if let Some(goal) = &options.goal {
        fs::write(config.goal_file(), goal).context("Failed to write goal file")?;
    }

    // 1. Map
    let map_command = config.map_command();
    if !map_command.exists() {
        return Err(PipelineError::MissingCommand {
            stage: Stage::Map,
            path: map_command,
        });
    }
    execute_stage(config, Stage::Map, &map_command, options)?;

    // 2. Plan
    let plan_command = config.plan_command();
    if !plan_command.exists() {
        return Err(PipelineError::MissingCommand {
            stage: Stage::Plan,
            path: plan_command,
        });
    }
    execute_stage(config, Stage::Plan, &plan_command, options)?;

    // 3. Build, best-effort: a missing builder skips the stage instead of
    // failing the run.
    let builder = options.builder.clone().or_else(|| detect_builder(config));
    let Some(builder) = builder else {
        println!(
            "{} Could not find a builder command ({}).",
            style("!").yellow(),
            BUILDER_CANDIDATES.join(" / ")
        );
        println!("  You can supply one via --builder PATH");
        return Ok(());
    };
    execute_stage(config, Stage::Build, &builder, options)?;

    println!(
        "{} Completed map → plan → build pipeline.",
        style("✓").green()
    );
    Ok(())
}

/// Report or invoke one stage, failing on a non-zero exit code.
fn execute_stage(
    config: &Config,
    stage: Stage,
    command_path: &Path,
    options: &RunOptions,
) -> Result<(), PipelineError> {
    if options.dry_run {
        println!(
            "[dry-run] Would run {}: {}",
            stage.label(),
            command_path.display()
        );
        return Ok(());
    }

    let code = dispatch::run_command(config, command_path, &[])?;
    if code != 0 {
        return Err(PipelineError::StageFailed { stage, code });
    }
    Ok(())
}

/// First existing builder candidate, in priority order.
pub fn detect_builder(config: &Config) -> Option<PathBuf> {
    config
        .builder_candidates()
        .into_iter()
        .find(|candidate| candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_commands(root: &Path, names: &[&str]) {
        let commands = root.join(".claude/commands");
        for name in names {
            let path = commands.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "# command").unwrap();
        }
    }

    fn test_config(root: &Path) -> Config {
        Config::new(root.to_path_buf(), None, false).unwrap()
    }

    #[test]
    fn detect_builder_picks_first_existing_candidate() {
        let dir = tempdir().unwrap();
        write_commands(
            dir.path(),
            &[
                "t_metaprompt_workflow.md",
                "experts/build/expert_build_workflow.md",
            ],
        );
        let config = test_config(dir.path());
        let builder = detect_builder(&config).unwrap();
        assert!(builder.ends_with("t_metaprompt_workflow.md"));

        // build.md outranks the others once present
        write_commands(dir.path(), &["build.md"]);
        let builder = detect_builder(&config).unwrap();
        assert!(builder.ends_with("build.md"));
    }

    #[test]
    fn detect_builder_returns_none_without_candidates() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        assert!(detect_builder(&config).is_none());
    }

    #[test]
    fn run_aborts_when_map_command_missing() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let err = run(&config, &RunOptions::default()).unwrap_err();
        match err {
            PipelineError::MissingCommand { stage, .. } => assert_eq!(stage, Stage::Map),
            other => panic!("Expected MissingCommand, got {other:?}"),
        }
    }

    #[test]
    fn run_aborts_when_plan_command_missing() {
        let dir = tempdir().unwrap();
        write_commands(dir.path(), &["map_prompts.md"]);
        let config = test_config(dir.path());
        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        let err = run(&config, &options).unwrap_err();
        match err {
            PipelineError::MissingCommand { stage, .. } => assert_eq!(stage, Stage::Plan),
            other => panic!("Expected MissingCommand, got {other:?}"),
        }
    }

    #[test]
    fn run_writes_goal_before_checking_stages() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let options = RunOptions {
            goal: Some("ship the parser".to_string()),
            ..Default::default()
        };
        // Map is missing, but the goal file lands first.
        run(&config, &options).unwrap_err();
        let goal = fs::read_to_string(config.goal_file()).unwrap();
        assert_eq!(goal, "ship the parser");
    }

    #[test]
    fn run_overwrites_previous_goal() {
        let dir = tempdir().unwrap();
        write_commands(dir.path(), &["map_prompts.md", "plan_prompts.md"]);
        let config = test_config(dir.path());
        config.ensure_docs_dir().unwrap();
        fs::write(config.goal_file(), "old goal text that is longer").unwrap();
        let options = RunOptions {
            goal: Some("new".to_string()),
            dry_run: true,
            ..Default::default()
        };
        run(&config, &options).unwrap();
        assert_eq!(fs::read_to_string(config.goal_file()).unwrap(), "new");
    }

    #[test]
    fn dry_run_without_builder_candidates_succeeds() {
        let dir = tempdir().unwrap();
        write_commands(dir.path(), &["map_prompts.md", "plan_prompts.md"]);
        let config = test_config(dir.path());
        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        run(&config, &options).unwrap();
    }

    #[test]
    fn explicit_builder_is_used_without_existence_check() {
        let dir = tempdir().unwrap();
        write_commands(dir.path(), &["map_prompts.md", "plan_prompts.md"]);
        let config = test_config(dir.path());
        let options = RunOptions {
            dry_run: true,
            builder: Some(PathBuf::from("/nowhere/custom_build.md")),
            ..Default::default()
        };
        run(&config, &options).unwrap();
    }
}
