//! Temporary branches that must not outlive a workflow.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use tracing::info;
use tracing::warn;

use crate::clients::git::GitClient;
use crate::clients::repo::RepoClient;
use crate::error::FlagError;

/// A branch created for the duration of one target workflow.
///
/// Call [`TempBranch::remove`] on every exit path. If the guard is dropped
/// without that (e.g. while unwinding), the cleanup commands run synchronously
/// from `Drop`.
pub struct TempBranch {
    name: String,
    dir: PathBuf,
    kind: BranchKind,
    removed: bool,
}

enum BranchKind {
    /// Plain git branch; cleanup returns to `original` and deletes the branch.
    Git { original: String },
    /// `repo start` topic branch; cleanup is `repo abandon`.
    Repo { binary: PathBuf },
}

struct CleanupStep {
    program: PathBuf,
    args: Vec<String>,
}

impl TempBranch {
    /// Create `name` from the current HEAD and check it out.
    ///
    /// The working tree must be clean apart from what the workflow itself
    /// writes: cleanup force-checks-out `original`.
    pub async fn create_git(git: &GitClient, name: &str, original: &str) -> Result<Self> {
        git.create_branch(name).await?;
        info!(branch = name, "created temporary branch");
        Ok(Self {
            name: name.to_string(),
            dir: git.path().to_path_buf(),
            kind: BranchKind::Git {
                original: original.to_string(),
            },
            removed: false,
        })
    }

    /// Start a topic branch with `repo start <name> .`.
    pub async fn start_repo(repo: &RepoClient, name: &str) -> Result<Self> {
        repo.start(name).await?;
        info!(branch = name, "started repo branch");
        Ok(Self {
            name: name.to_string(),
            dir: repo.path().to_path_buf(),
            kind: BranchKind::Repo {
                binary: repo.binary().to_path_buf(),
            },
            removed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delete the branch and restore the previously checked-out branch.
    ///
    /// Once this has succeeded, further calls do nothing. After a failure the
    /// next call (or `Drop`) runs the cleanup again.
    pub async fn remove(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }

        for step in self.cleanup_steps() {
            let output = tokio::process::Command::new(&step.program)
                .current_dir(&self.dir)
                .args(&step.args)
                .output()
                .await
                .with_context(|| format!("Failed to execute {}", step.program.display()))?;
            if !output.status.success() {
                return Err(step.failure(&self.dir, output).into());
            }
        }
        self.removed = true;
        info!(branch = %self.name, "removed temporary branch");
        Ok(())
    }

    /// Remove the branch after the workflow finished with `outcome`.
    ///
    /// The workflow's own error wins over a cleanup error; the latter is only
    /// logged in that case.
    pub async fn release(mut self, outcome: Result<()>) -> Result<()> {
        let cleanup = self.remove().await;
        match (outcome, cleanup) {
            (Err(e), Err(cleanup_err)) => {
                warn!(
                    "Failed to remove temporary branch {}: {:#}",
                    self.name, cleanup_err
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), cleanup) => cleanup,
        }
    }

    fn cleanup_steps(&self) -> Vec<CleanupStep> {
        match &self.kind {
            BranchKind::Git { original } => vec![
                CleanupStep {
                    program: PathBuf::from("git"),
                    args: vec!["checkout".into(), "--force".into(), original.clone()],
                },
                CleanupStep {
                    program: PathBuf::from("git"),
                    args: vec!["branch".into(), "-D".into(), self.name.clone()],
                },
            ],
            BranchKind::Repo { binary } => vec![CleanupStep {
                program: binary.clone(),
                args: vec!["abandon".into(), self.name.clone()],
            }],
        }
    }
}

impl CleanupStep {
    fn failure(&self, dir: &Path, output: std::process::Output) -> FlagError {
        FlagError::ExternalCommand {
            command: format!("{} {}", self.program.display(), self.args.join(" ")),
            dir: dir.to_path_buf(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl Drop for TempBranch {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        warn!(branch = %self.name, "temporary branch dropped without cleanup, removing it now");
        for step in self.cleanup_steps() {
            match std::process::Command::new(&step.program)
                .current_dir(&self.dir)
                .args(&step.args)
                .output()
            {
                Ok(output) if output.status.success() => {}
                Ok(output) => {
                    warn!("{}", step.failure(&self.dir, output));
                    return;
                }
                Err(e) => {
                    warn!("Failed to execute {}: {}", step.program.display(), e);
                    return;
                }
            }
        }
    }
}
