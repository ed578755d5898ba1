use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;

const ANDROID_PREPARER_KEY: &str = "legacyflag.androidPreparer";
const ANDROID_PROJECT_DIR_KEY: &str = "legacyflag.androidProjectDir";
const GOOGLE3_REGISTRAR_KEY: &str = "legacyflag.google3Registrar";
const CHROMIUM_PRIMARY_BRANCH_KEY: &str = "legacyflag.chromiumPrimaryBranch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program that sets up the Android checkout and prints the repo binary.
    pub android_preparer: PathBuf,
    /// Skia's project directory inside the Android checkout.
    pub android_project_dir: PathBuf,
    /// Program that adds a flag to a Google3 workspace.
    pub google3_registrar: PathBuf,
    /// The branch a Chromium checkout must be on before we touch it.
    pub chromium_primary_branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            android_preparer: PathBuf::from("upload_to_android"),
            android_project_dir: PathBuf::from("external/skia"),
            google3_registrar: expand_home("~/skia-g3/scripts/citc_flag"),
            chromium_primary_branch: "main".to_string(),
        }
    }
}

impl Config {
    /// Load config from git config, falling back to defaults for unset keys
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            android_preparer: get(ANDROID_PREPARER_KEY)?
                .map(|v| expand_home(&v))
                .unwrap_or(defaults.android_preparer),
            android_project_dir: get(ANDROID_PROJECT_DIR_KEY)?
                .map(PathBuf::from)
                .unwrap_or(defaults.android_project_dir),
            google3_registrar: get(GOOGLE3_REGISTRAR_KEY)?
                .map(|v| expand_home(&v))
                .unwrap_or(defaults.google3_registrar),
            chromium_primary_branch: get(CHROMIUM_PRIMARY_BRANCH_KEY)?
                .unwrap_or(defaults.chromium_primary_branch),
        })
    }

    /// Create a new config with explicit values (useful for tests)
    pub fn new(
        android_preparer: PathBuf,
        android_project_dir: PathBuf,
        google3_registrar: PathBuf,
        chromium_primary_branch: String,
    ) -> Self {
        Self {
            android_preparer,
            android_project_dir,
            google3_registrar,
            chromium_primary_branch,
        }
    }

    /// Skia's directory inside an Android checkout rooted at `android_dir`.
    pub fn android_project(&self, android_dir: &Path) -> PathBuf {
        android_dir.join(&self.android_project_dir)
    }
}

/// Read a single git config value. Unset keys are `None`.
fn get(key: &str) -> Result<Option<String>> {
    let output = std::process::Command::new("git")
        .args(["config", "--get", key])
        .output()
        .context("Failed to execute git command")?;

    // Exit code 1 means the key is unset
    if output.status.code() == Some(1) {
        return Ok(None);
    }
    if !output.status.success() {
        anyhow::bail!(
            "Failed to read {} from git config: {}",
            key,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let value = String::from_utf8(output.stdout)?.trim().to_string();
    Ok(Some(value).filter(|v| !v.is_empty()))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
