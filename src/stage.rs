//! Stage definitions for the tac pipeline.

use std::fmt;

/// One of the three ordered pipeline steps.
///
/// Map and Plan are required: a missing command file aborts the run. Build
/// is best-effort: when no builder command resolves, the pipeline still
/// finishes successfully with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Map,
    Plan,
    Build,
}

impl Stage {
    /// Short name used when reporting intended actions (dry-run lines).
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Map => "map",
            Stage::Plan => "plan",
            Stage::Build => "builder",
        }
    }
}

/// Command name as reported in failure messages.
impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Map => write!(f, "map_prompts"),
            Stage::Plan => write!(f, "plan_prompts"),
            Stage::Build => write!(f, "builder"),
        }
    }
}
