use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use tracing::info;
use tracing::instrument;

use crate::App;
use crate::app::ANDROID_BRANCH;
use crate::branch::TempBranch;
use crate::clients::git::GitClient;
use crate::clients::repo::RepoClient;
use crate::collaborators::FlagRegistrar;
use crate::collaborators::WorkspacePreparer;
use crate::collaborators::preparer_error;
use crate::error::FlagError;
use crate::flag::FlagName;
use crate::flag::commit_message;
use crate::header::defines_flag;
use crate::header::insert_at;

/// Android's hand-maintained Skia config, relative to the Skia project.
pub const ANDROID_CONFIG_FILE: &str = "include/config/SkUserConfigManual.h";

/// The define is inserted right above the closing include guard.
pub const ANDROID_ANCHOR: &str = "#endif // SkUserConfigManual_DEFINED\n";

impl<P: WorkspacePreparer, R: FlagRegistrar> App<P, R> {
    /// Add the flag to an Android checkout and upload it with `repo`.
    ///
    /// The checkout is created under `android_dir` if needed. The `repo`
    /// topic branch is abandoned at the end whether or not the upload went
    /// through.
    #[instrument(skip_all, fields(flag = %flag, dir = %android_dir.display()))]
    pub async fn add_to_android(&self, flag: &FlagName, android_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(android_dir)
            .await
            .with_context(|| format!("Failed to create {}", android_dir.display()))?;

        let repo_binary = self
            .preparer
            .prepare(android_dir)
            .await
            .map_err(preparer_error)?;
        info!(repo = %repo_binary.display(), "prepared checkout");

        let project = self.config.android_project(android_dir);
        let config_file = Path::new(ANDROID_CONFIG_FILE);
        if defines_flag(&project.join(config_file), flag)? {
            bail!(FlagError::Precondition(format!(
                "{} is already defined in {}",
                flag, ANDROID_CONFIG_FILE
            )));
        }

        let repo = RepoClient::new(repo_binary, project.clone());
        let git = GitClient::new(project.clone());
        let branch = TempBranch::start_repo(&repo, ANDROID_BRANCH).await?;

        let outcome = async {
            let content = format!("  #define {}\n", flag);
            insert_at(&project.join(config_file), ANDROID_ANCHOR, 0, &content)?;
            info!("edited {}", ANDROID_CONFIG_FILE);

            git.add(config_file).await?;
            git.commit_file(config_file, &commit_message(flag)).await?;
            info!("committed");

            repo.upload_verify().await?;
            info!("uploaded");
            Ok::<(), anyhow::Error>(())
        }
        .await;

        branch.release(outcome).await
    }
}
