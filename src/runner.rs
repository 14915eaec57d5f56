//! Install/build and commit steps run in the project root after pruning.

use clap::ValueEnum;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::{debug, warn};

/// Default install-then-build command
pub const DEFAULT_BUILD_COMMAND: &str = "npm install --legacy-peer-deps && npm run build";

/// Default commit command
pub const DEFAULT_COMMIT_COMMAND: &str = "git commit -am 'auto: cleanup ui and build'";

/// When the commit step runs relative to the build result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CommitPolicy {
    /// Commit even when the build failed
    #[default]
    Always,
    /// Commit only after a successful build
    OnBuildSuccess,
}

/// Result of one shell step. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// Exited unsuccessfully; `code` is `None` when killed by a signal
    Failed { code: Option<i32> },
    SpawnFailed(String),
    /// Disabled by options, or held back by the commit policy
    Skipped,
}

impl StepOutcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            StepOutcome::Succeeded
        } else {
            StepOutcome::Failed {
                code: status.code(),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Succeeded => write!(f, "succeeded"),
            StepOutcome::Failed { code: Some(code) } => write!(f, "failed with exit code {}", code),
            StepOutcome::Failed { code: None } => write!(f, "terminated by signal"),
            StepOutcome::SpawnFailed(err) => write!(f, "could not start: {}", err),
            StepOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcomes of the build and commit steps for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub build: StepOutcome,
    pub commit: StepOutcome,
}

/// Runs the build and commit shell commands in a project root
#[derive(Debug, Clone)]
pub struct BuildRunner {
    pub build_command: String,
    pub commit_command: String,
    pub run_build: bool,
    pub run_commit: bool,
    pub policy: CommitPolicy,
}

impl Default for BuildRunner {
    fn default() -> Self {
        Self {
            build_command: DEFAULT_BUILD_COMMAND.to_string(),
            commit_command: DEFAULT_COMMIT_COMMAND.to_string(),
            run_build: true,
            run_commit: true,
            policy: CommitPolicy::default(),
        }
    }
}

fn shell_command(script: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(script);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }
}

/// Run a shell script in `dir` with inherited stdout/stderr and wait for it
fn run_step(label: &str, script: &str, dir: &Path) -> StepOutcome {
    debug!(step = label, script, dir = %dir.display(), "running step");

    let outcome = match shell_command(script).current_dir(dir).status() {
        Ok(status) => StepOutcome::from_status(status),
        Err(err) => StepOutcome::SpawnFailed(err.to_string()),
    };

    if !outcome.is_success() {
        warn!(step = label, dir = %dir.display(), %outcome, "step did not succeed");
    }
    outcome
}

impl BuildRunner {
    /// Run the build step, then the commit step as the policy allows
    pub fn run(&self, project_root: &Path) -> BuildReport {
        let build = if self.run_build {
            run_step("build", &self.build_command, project_root)
        } else {
            StepOutcome::Skipped
        };

        let policy_allows = match self.policy {
            CommitPolicy::Always => true,
            CommitPolicy::OnBuildSuccess => !self.run_build || build.is_success(),
        };

        let commit = if self.run_commit && policy_allows {
            run_step("commit", &self.commit_command, project_root)
        } else {
            StepOutcome::Skipped
        };

        BuildReport { build, commit }
    }
}
