//! Assistant CLI dispatch.
//!
//! Stage command files are run through whichever assistant CLI is
//! installed. Candidates are tried in a fixed order, and the search-path
//! check runs fresh on every call, so a tool installed mid-run is picked up
//! by the next stage.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::process::Command;

use crate::config::Config;

/// One way of invoking the assistant CLI: an executable plus the argument
/// tokens that precede the command-file path.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// Name reported in the not-found diagnostic: the executable plus any
    /// tokens that select the assistant (`npx claude`), without the
    /// trailing subcommand.
    pub fn searched_name(&self) -> String {
        let mut name = self.program.clone();
        for arg in &self.args[..self.args.len().saturating_sub(1)] {
            name.push(' ');
            name.push_str(arg);
        }
        name
    }

    /// Full command line for a given command file.
    fn render(&self, command_path: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(command_path.display().to_string());
        parts.join(" ")
    }
}

/// Invocation patterns to try, in order. An assistant override is tried
/// first; the built-in candidates follow.
pub fn candidates(assistant: Option<&str>) -> Vec<Invocation> {
    let mut patterns = Vec::new();
    if let Some(command) = assistant {
        patterns.push(Invocation::new(command, &["run"]));
    }
    patterns.push(Invocation::new("claude", &["run"]));
    patterns.push(Invocation::new("cc", &["run"]));
    patterns.push(Invocation::new("codex", &["run"]));
    patterns.push(Invocation::new("npx", &["claude", "run"]));
    patterns
}

/// Filter candidates to those whose executable resolves on the search path.
fn available(patterns: &[Invocation], verbose: bool) -> Vec<Invocation> {
    patterns
        .iter()
        .filter(|invocation| {
            let found = which::which(&invocation.program).is_ok();
            if !found && verbose {
                println!("  {} not found on PATH", invocation.program);
            }
            found
        })
        .cloned()
        .collect()
}

/// Run a command file through the first available assistant CLI.
///
/// The subprocess inherits stdio, runs in the project directory, and sees
/// the parent environment extended with `extra_env`. Returns the child's
/// exit code, or 127 with a diagnostic when no candidate resolves.
pub fn run_command(
    config: &Config,
    command_path: &Path,
    extra_env: &[(String, String)],
) -> Result<i32> {
    let patterns = candidates(config.assistant.as_deref());
    for invocation in available(&patterns, config.verbose) {
        println!(
            "{} Running: {}",
            style("→").cyan(),
            invocation.render(command_path)
        );
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .arg(command_path)
            .current_dir(&config.project_dir);
        for (key, value) in extra_env {
            cmd.env(key, value);
        }
        match cmd.status() {
            // A signal-terminated child has no exit code; report -1 so
            // callers treat it as a failure.
            Ok(status) => return Ok(status.code().unwrap_or(-1)),
            // The search-path hit can go stale before the spawn; fall
            // through to the next candidate.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to run {}", invocation.render(command_path))
                });
            }
        }
    }

    let searched: Vec<String> = patterns
        .iter()
        .map(|invocation| invocation.searched_name())
        .collect();
    println!(
        "{} No supported CLI found to run assistant commands. Searched for: {}.",
        style("!").yellow(),
        searched.join(", ")
    );
    println!(
        "  Please run the command manually: {}",
        command_path.display()
    );
    Ok(127)
}
