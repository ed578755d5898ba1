use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use tokio::process::Command;

use crate::error::FlagError;

/// Client for the Android `repo` tool, run from inside one project.
pub struct RepoClient {
    binary: PathBuf,
    path: PathBuf,
}

impl RepoClient {
    pub fn new(binary: PathBuf, path: PathBuf) -> Self {
        Self { binary, path }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a topic branch in the current project.
    pub async fn start(&self, branch: &str) -> Result<()> {
        self.run(&["start", branch, "."]).await
    }

    pub async fn upload_verify(&self) -> Result<()> {
        self.run(&["upload", "--verify"]).await
    }

    pub async fn abandon(&self, branch: &str) -> Result<()> {
        self.run(&["abandon", branch]).await
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        debug!(
            "{} {} (in {})",
            self.binary.display(),
            args.join(" "),
            self.path.display()
        );
        let output = Command::new(&self.binary)
            .current_dir(&self.path)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.binary.display()))?;

        if !output.status.success() {
            return Err(FlagError::ExternalCommand {
                command: format!("{} {}", self.binary.display(), args.join(" ")),
                dir: self.path.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}
