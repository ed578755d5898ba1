use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use tokio::process::Command;

use crate::error::FlagError;

// -----------------------------------------------------------------------------
// Types

/// Git client bound to one working tree.
pub struct GitClient {
    path: PathBuf,
}

// -----------------------------------------------------------------------------
// GitClient impl

impl GitClient {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the checked-out branch, or "HEAD" when detached.
    pub async fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let output = Command::new("git")
            .current_dir(&self.path)
            .args([
                "rev-parse",
                "--quiet",
                "--verify",
                &format!("refs/heads/{}", branch),
            ])
            .output()
            .await
            .context("Failed to execute git command")?;

        // Exit code 0 means the ref exists, 1 means it doesn't
        Ok(output.status.success())
    }

    /// The commit at the top of the stash, if there is one.
    pub async fn stash_top(&self) -> Result<Option<String>> {
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(["rev-parse", "--quiet", "--verify", "refs/stash"])
            .output()
            .await
            .context("Failed to execute git command")?;

        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8(output.stdout)?.trim().to_string()))
    }

    pub async fn stash_push(&self) -> Result<()> {
        self.run(&["stash", "push"]).await.map(|_| ())
    }

    pub async fn stash_pop(&self) -> Result<()> {
        self.run(&["stash", "pop"]).await.map(|_| ())
    }

    pub async fn create_branch(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", "-b", branch]).await.map(|_| ())
    }

    pub async fn add(&self, file: &Path) -> Result<()> {
        let file = file.to_string_lossy();
        self.run(&["add", "--", &file]).await.map(|_| ())
    }

    /// Commit exactly the given file, ignoring anything else staged.
    pub async fn commit_file(&self, file: &Path, message: &str) -> Result<()> {
        let file = file.to_string_lossy();
        self.run(&["commit", "-m", message, "--", &file])
            .await
            .map(|_| ())
    }

    /// Upload the current branch to Gerrit with depot_tools' `git cl`.
    pub async fn cl_upload(&self, message: &str) -> Result<()> {
        self.run(&["cl", "upload", "-m", message, "-f"])
            .await
            .map(|_| ())
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("git {} (in {})", args.join(" "), self.path.display());
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(args)
            .output()
            .await
            .context("Failed to execute git command")?;

        if !output.status.success() {
            return Err(FlagError::ExternalCommand {
                command: format!("git {}", args.join(" ")),
                dir: self.path.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }
}
