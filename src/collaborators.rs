//! Environment-specific helpers the Android and Google3 workflows depend on.
//!
//! Both are external programs that only exist on a suitably set-up machine, so
//! they are resolved when the target is actually requested. A missing or
//! failing helper is a [`FlagError::Collaborator`], not a crash.

#![allow(async_fn_in_trait)]

use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use log::debug;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;

use crate::error::FlagError;
use crate::flag::FlagName;

const PREPARER: &str = "Android workspace preparer";
const REGISTRAR: &str = "Google3 flag registrar";

const GOOGLE3_SETUP_HINT: &str = "Please see https://sites.google.com/a/google.com/skia/rebaseline#g3_flag for Google3 setup.";

// -----------------------------------------------------------------------------
// Traits

/// Sets up an Android checkout for making a Skia change.
#[cfg_attr(test, automock)]
pub trait WorkspacePreparer {
    /// Make sure a checkout exists under `dir` and is ready for a new topic
    /// branch. Returns the `repo` binary to drive it with.
    async fn prepare(&self, dir: &Path) -> Result<PathBuf>;
}

/// Adds a flag to a Google3 workspace, creating the workspace if needed.
#[cfg_attr(test, automock)]
pub trait FlagRegistrar {
    async fn register(&self, workspace: &str, flag: &FlagName) -> Result<()>;
}

// -----------------------------------------------------------------------------
// CommandPreparer

/// Runs `<program> <dir>`; the last non-empty line of its stdout is the
/// `repo` binary.
pub struct CommandPreparer {
    program: PathBuf,
}

impl CommandPreparer {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl WorkspacePreparer for CommandPreparer {
    async fn prepare(&self, dir: &Path) -> Result<PathBuf> {
        let program = resolve(PREPARER, &self.program, None)?;
        debug!("{} {}", program.display(), dir.display());
        let stdout = run_helper(PREPARER, Command::new(&program).arg(dir)).await?;

        let Some(repo_binary) = stdout.lines().map(str::trim).rfind(|line| !line.is_empty())
        else {
            return Err(FlagError::Collaborator {
                helper: PREPARER,
                message: format!("{} did not print a repo binary", program.display()),
            }
            .into());
        };

        Ok(dir.join(repo_binary))
    }
}

// -----------------------------------------------------------------------------
// CommandRegistrar

/// Runs `<program> <workspace> <flag>`.
pub struct CommandRegistrar {
    program: PathBuf,
}

impl CommandRegistrar {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl FlagRegistrar for CommandRegistrar {
    async fn register(&self, workspace: &str, flag: &FlagName) -> Result<()> {
        let program = resolve(REGISTRAR, &self.program, Some(GOOGLE3_SETUP_HINT))?;
        debug!("{} {} {}", program.display(), workspace, flag);
        run_helper(
            REGISTRAR,
            Command::new(&program).arg(workspace).arg(flag.as_str()),
        )
        .await?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Classify an error raised by a helper. Errors that already carry a
/// [`FlagError`] are passed through unchanged.
pub(crate) fn collaborator_error(helper: &'static str, err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<FlagError>().is_some() {
        return err;
    }
    FlagError::Collaborator {
        helper,
        message: format!("{:#}", err),
    }
    .into()
}

pub(crate) fn preparer_error(err: anyhow::Error) -> anyhow::Error {
    collaborator_error(PREPARER, err)
}

pub(crate) fn registrar_error(err: anyhow::Error) -> anyhow::Error {
    collaborator_error(REGISTRAR, err)
}

fn resolve(helper: &'static str, program: &Path, hint: Option<&str>) -> Result<PathBuf> {
    which::which(program).map_err(|e| {
        let mut message = format!("{} unavailable ({})", program.display(), e);
        if let Some(hint) = hint {
            message.push('\n');
            message.push_str(hint);
        }
        FlagError::Collaborator { helper, message }.into()
    })
}

async fn run_helper(helper: &'static str, command: &mut Command) -> Result<String> {
    let output = command.output().await.map_err(|e| FlagError::Collaborator {
        helper,
        message: format!("failed to start: {}", e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(FlagError::Collaborator {
            helper,
            message: format!("exited with {}: {}", output.status, stderr),
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
