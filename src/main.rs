use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use legacy_flag::App;
use legacy_flag::Config;
use legacy_flag::FlagName;
use legacy_flag::Targets;
use legacy_flag::collaborators::CommandPreparer;
use legacy_flag::collaborators::CommandRegistrar;
use legacy_flag::config::expand_home;
use tracing::level_filters::LevelFilter;

const EXAMPLES: &str = "\
Example usage:
  $ add-legacy-flag SK_SUPPORT_LEGACY_SOMETHING \\
      -a /data/android -c ~/chromium/src -g legacyflag

If you only need to add the flag to one repo, for example Android, give only
the -a (--android-dir) argument:
  $ add-legacy-flag SK_SUPPORT_LEGACY_SOMETHING -a /data/android";

#[derive(Parser)]
#[command(name = "add-legacy-flag")]
#[command(about = "Add a Skia legacy flag to multiple client repos and upload the changes for review")]
#[command(after_long_help = EXAMPLES)]
pub struct Cli {
    /// Legacy flag name
    pub flag: FlagName,

    /// Directory where an Android checkout will be created (if it does not
    /// already exist). Note: ~1GB space will be used.
    #[arg(short, long)]
    pub android_dir: Option<String>,

    /// Directory of an EXISTING Chromium checkout (e.g., ~/chromium/src)
    #[arg(short, long)]
    pub chromium_dir: Option<String>,

    /// Google3 workspace to be created (if it does not already exist)
    #[arg(short, long)]
    pub google3: Option<String>,
}

impl Cli {
    fn targets(&self) -> Targets {
        Targets {
            android_dir: self.android_dir.as_deref().map(expand_home),
            chromium_dir: self.chromium_dir.as_deref().map(expand_home),
            google3: self.google3.clone(),
        }
    }
}

fn setup_logging() -> Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_timer(timer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging()?;

    let config = Config::load()?;
    let app = App::new(
        config.clone(),
        CommandPreparer::new(config.android_preparer.clone()),
        CommandRegistrar::new(config.google3_registrar.clone()),
    );

    let status = app
        .run(
            &cli.flag,
            &cli.targets(),
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await?;
    Ok(ExitCode::from(status))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_all_targets() {
        let cli = Cli::try_parse_from([
            "add-legacy-flag",
            "SK_SUPPORT_LEGACY_FOO",
            "-a",
            "/data/android",
            "--chromium-dir",
            "/src/chromium/src",
            "-g",
            "legacyflag",
        ])
        .unwrap();

        assert_eq!(cli.flag.as_str(), "SK_SUPPORT_LEGACY_FOO");
        let targets = cli.targets();
        assert_eq!(targets.android_dir, Some(PathBuf::from("/data/android")));
        assert_eq!(targets.chromium_dir, Some(PathBuf::from("/src/chromium/src")));
        assert_eq!(targets.google3.as_deref(), Some("legacyflag"));
    }

    #[test]
    fn test_parse_without_targets() {
        let cli = Cli::try_parse_from(["add-legacy-flag", "SK_SUPPORT_LEGACY_FOO"]).unwrap();
        assert!(cli.targets().is_empty());
    }

    #[test]
    fn test_flag_is_required_and_non_empty() {
        assert!(Cli::try_parse_from(["add-legacy-flag", "-a", "/data/android"]).is_err());
        assert!(Cli::try_parse_from(["add-legacy-flag", "", "-a", "/data/android"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }
}
