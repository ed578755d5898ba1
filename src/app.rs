use std::path::PathBuf;

use crate::collaborators::FlagRegistrar;
use crate::collaborators::WorkspacePreparer;
use crate::config::Config;

/// Prefix of the temporary Chromium branch; a random number is appended.
pub const CHROMIUM_BRANCH_PREFIX: &str = "legacyflag_";

/// Name of the `repo` topic branch used in the Android checkout.
pub const ANDROID_BRANCH: &str = "flag";

pub struct App<P, R> {
    pub config: Config,
    pub preparer: P,
    pub registrar: R,
}

impl<P: WorkspacePreparer, R: FlagRegistrar> App<P, R> {
    pub fn new(config: Config, preparer: P, registrar: R) -> Self {
        Self {
            config,
            preparer,
            registrar,
        }
    }
}

/// The checkouts a single run should touch. Absent targets are skipped.
#[derive(Debug, Clone, Default)]
pub struct Targets {
    pub android_dir: Option<PathBuf>,
    pub chromium_dir: Option<PathBuf>,
    pub google3: Option<String>,
}

impl Targets {
    pub fn is_empty(&self) -> bool {
        self.android_dir.is_none() && self.chromium_dir.is_none() && self.google3.is_none()
    }
}
