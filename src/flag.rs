use std::fmt::Display;
use std::str::FromStr;

use anyhow::bail;

/// A legacy flag, used verbatim as a preprocessor symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagName(String);

impl FlagName {
    pub fn new(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            bail!("Flag name must not be empty");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FlagName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for FlagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A checkout the flag can be added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Android tree with Skia under external/skia, uploaded with `repo`.
    Android,
    /// Existing Chromium checkout, uploaded with `git cl`.
    Chromium,
    /// Google3 workspace, handled entirely by the registrar helper.
    Google3,
}

impl Target {
    /// Where the uploaded change can be reviewed.
    pub fn review_url(&self) -> &'static str {
        match self {
            Self::Android => "http://goto.google.com/androidcl",
            Self::Chromium => "https://chromium-review.googlesource.com",
            Self::Google3 => "http://goto.google.com/cl",
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => f.write_str("Android"),
            Self::Chromium => f.write_str("Chromium"),
            Self::Google3 => f.write_str("Google3"),
        }
    }
}

/// Commit message shared by the Android and Chromium changes.
pub fn commit_message(flag: &FlagName) -> String {
    format!(
        "Add {}\n\nTest: Presubmit checks will test this change.",
        flag
    )
}
