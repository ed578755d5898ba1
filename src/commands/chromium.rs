use std::path::Path;

use anyhow::Result;
use anyhow::bail;
use rand::Rng as _;
use tracing::info;
use tracing::instrument;

use crate::App;
use crate::app::CHROMIUM_BRANCH_PREFIX;
use crate::branch::TempBranch;
use crate::clients::git::GitClient;
use crate::collaborators::FlagRegistrar;
use crate::collaborators::WorkspacePreparer;
use crate::error::FlagError;
use crate::flag::FlagName;
use crate::flag::commit_message;
use crate::header::defines_flag;
use crate::header::insert_at;

/// Skia's user config inside a Chromium checkout.
pub const CHROMIUM_CONFIG_FILE: &str = "skia/config/SkUserConfig.h";

/// The flag block is inserted right above this line.
pub const CHROMIUM_SEPARATOR: &str =
    "///////////////////////// Imported from BUILD.gn and skia_common.gypi\n";

const MAX_BRANCH_ATTEMPTS: usize = 16;

impl<P: WorkspacePreparer, R: FlagRegistrar> App<P, R> {
    /// Add the flag to an existing Chromium checkout and upload it with `git cl`.
    ///
    /// 1. Require a clean checkout of the primary branch.
    /// 2. Create a randomly named temporary branch.
    /// 3. Insert an `#ifndef`/`#define`/`#endif` block above the separator in
    ///    `skia/config/SkUserConfig.h`, commit it and upload it.
    /// 4. Return to the primary branch and delete the temporary branch, whether
    ///    or not step 3 succeeded.
    #[instrument(skip_all, fields(flag = %flag, dir = %dir.display()))]
    pub async fn add_to_chromium(&self, flag: &FlagName, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            bail!(FlagError::Precondition(format!(
                "Chromium checkout {} does not exist",
                dir.display()
            )));
        }
        let git = GitClient::new(dir.to_path_buf());
        let primary = &self.config.chromium_primary_branch;
        let config_file = Path::new(CHROMIUM_CONFIG_FILE);

        self.check_clean_primary_branch(&git).await?;
        if defines_flag(&dir.join(config_file), flag)? {
            bail!(FlagError::Precondition(format!(
                "{} is already defined in {}",
                flag, CHROMIUM_CONFIG_FILE
            )));
        }

        let name = unused_branch_name(&git).await?;
        let branch = TempBranch::create_git(&git, &name, primary).await?;

        let outcome = async {
            let content = format!("#ifndef {0}\n#define {0}\n#endif\n\n", flag);
            insert_at(&dir.join(config_file), CHROMIUM_SEPARATOR, 0, &content)?;
            info!("edited {}", CHROMIUM_CONFIG_FILE);

            git.add(config_file).await?;
            git.commit_file(config_file, &commit_message(flag)).await?;
            info!("committed");

            git.cl_upload(&format!("Add {}", flag)).await?;
            info!("uploaded");
            Ok::<(), anyhow::Error>(())
        }
        .await;

        branch.release(outcome).await
    }

    /// Fail unless the checkout is on the primary branch with no local changes.
    ///
    /// Local changes are detected by stashing; a stash created here is popped
    /// again before returning.
    async fn check_clean_primary_branch(&self, git: &GitClient) -> Result<()> {
        let primary = &self.config.chromium_primary_branch;
        let hint = format!(
            "Please checkout a clean {} branch at your Chromium checkout ({}) before running this tool",
            primary,
            git.path().display()
        );

        let current = git.current_branch().await?;
        if &current != primary {
            bail!(FlagError::Precondition(format!(
                "{} (currently on {})",
                hint, current
            )));
        }

        let stash_before = git.stash_top().await?;
        git.stash_push().await?;
        if git.stash_top().await? != stash_before {
            git.stash_pop().await?;
            bail!(FlagError::Precondition(format!(
                "{} (found uncommitted changes)",
                hint
            )));
        }

        Ok(())
    }
}

async fn unused_branch_name(git: &GitClient) -> Result<String> {
    for _ in 0..MAX_BRANCH_ATTEMPTS {
        let name = format!("{}{}", CHROMIUM_BRANCH_PREFIX, random_suffix());
        if !git.branch_exists(&name).await? {
            return Ok(name);
        }
    }
    bail!(
        "Could not find an unused {}* branch name in {}",
        CHROMIUM_BRANCH_PREFIX,
        git.path().display()
    )
}

fn random_suffix() -> u32 {
    rand::rng().random_range(1..=10_000)
}
