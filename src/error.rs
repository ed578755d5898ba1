use std::path::PathBuf;

use thiserror::Error;

/// The kinds of failure a target workflow can surface.
///
/// Workflows return `anyhow::Result`; these values travel inside the
/// `anyhow::Error` and can be recovered with `downcast_ref::<FlagError>()`.
#[derive(Debug, Error)]
pub enum FlagError {
    /// The checkout is not in a state we are willing to mutate.
    #[error("{0}")]
    Precondition(String),

    /// The config header no longer contains the line we insert relative to.
    #[error("anchor line {anchor:?} not found in {}", path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed in {} ({}): {stderr}", dir.display(), exit_description(*code))]
    ExternalCommand {
        command: String,
        dir: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// An environment-specific helper program is missing or reported failure.
    #[error("{helper}: {message}")]
    Collaborator {
        helper: &'static str,
        message: String,
    },
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
