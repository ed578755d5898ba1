use anyhow::Result;
use tracing::info;
use tracing::instrument;

use crate::App;
use crate::collaborators::FlagRegistrar;
use crate::collaborators::WorkspacePreparer;
use crate::collaborators::registrar_error;
use crate::flag::FlagName;

impl<P: WorkspacePreparer, R: FlagRegistrar> App<P, R> {
    /// Hand the flag to the Google3 registrar; nothing is edited locally.
    #[instrument(skip_all, fields(flag = %flag, workspace = workspace))]
    pub async fn add_to_google3(&self, flag: &FlagName, workspace: &str) -> Result<()> {
        self.registrar
            .register(workspace, flag)
            .await
            .map_err(registrar_error)?;
        info!("registered");
        Ok(())
    }
}
