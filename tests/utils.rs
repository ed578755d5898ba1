#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use legacy_flag::FlagName;
use legacy_flag::collaborators::FlagRegistrar;
use legacy_flag::collaborators::WorkspacePreparer;
use tokio::process::Command;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Stand-in for depot_tools' `git cl`. Records what would have been uploaded
/// inside the repository's git dir.
const FAKE_GIT_CL: &str = r#"#!/bin/sh
git_dir=$(git rev-parse --git-dir)
if [ -e "$git_dir/fail_upload" ]; then
  echo "upload rejected" >&2
  exit 1
fi
echo "$@" > "$git_dir/upload_args"
git log -1 --format=%B > "$git_dir/uploaded_message"
git show HEAD:skia/config/SkUserConfig.h > "$git_dir/uploaded_config"
"#;

/// Stand-in for Android's `repo`, driving a single plain git project.
const FAKE_REPO: &str = r#"#!/bin/sh
git_dir=$(git rev-parse --git-dir)
case "$1" in
  start)
    git checkout -q -b "$2"
    ;;
  upload)
    if [ -e "$git_dir/fail_upload" ]; then
      echo "upload rejected" >&2
      exit 1
    fi
    echo "$@" > "$git_dir/upload_args"
    git log -1 --format=%B > "$git_dir/uploaded_message"
    git show HEAD:include/config/SkUserConfigManual.h > "$git_dir/uploaded_config"
    ;;
  abandon)
    git checkout -q main && git branch -q -D "$2"
    ;;
  *)
    exit 2
    ;;
esac
"#;

fn fake_bin_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("fake-bin")
}

/// Write the fake `git-cl` and `repo` tools.
///
/// Repositories from [`create_git_repo`] alias `git cl` to the fake, and tests
/// hand [`fake_repo`] to the workflow through the preparer.
pub fn install_fake_tools() -> std::io::Result<()> {
    let bin_dir = fake_bin_dir();
    std::fs::create_dir_all(&bin_dir)?;
    write_script(&bin_dir.join("git-cl"), FAKE_GIT_CL)?;
    write_script(&bin_dir.join("repo"), FAKE_REPO)?;
    Ok(())
}

/// The fake `repo` tool written by [`install_fake_tools`].
pub fn fake_repo() -> PathBuf {
    fake_bin_dir().join("repo")
}

pub fn write_script(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

/// Creates a git repository on branch `main` in the given directory.
///
/// This initializes the repo, sets basic git config needed for commits and
/// points `git cl` at the fake.
/// The directory should already exist.
pub async fn create_git_repo(dir: &Path) -> anyhow::Result<()> {
    git(dir, &["init", "--initial-branch=main"]).await?;
    git(dir, &["config", "user.name", "Test User"]).await?;
    git(dir, &["config", "user.email", "test@example.com"]).await?;
    git(dir, &["config", "commit.gpgsign", "false"]).await?;
    // Only used when no real git-cl is on PATH
    let git_cl = format!("!'{}'", fake_bin_dir().join("git-cl").display());
    git(dir, &["config", "alias.cl", &git_cl]).await?;
    Ok(())
}

/// Writes a file (creating parent directories) and commits it.
pub async fn commit_file(
    dir: &Path,
    filename: &str,
    contents: &str,
    message: &str,
) -> anyhow::Result<()> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&file_path, contents).await?;
    git(dir, &["add", filename]).await?;
    git(dir, &["commit", "-q", "-m", message]).await?;
    Ok(())
}

/// Runs git and returns its trimmed stdout.
pub async fn git(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .await?;
    anyhow::ensure!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Local branches, one per line.
pub async fn branches(dir: &Path) -> anyhow::Result<Vec<String>> {
    let output = git(dir, &["branch", "--format=%(refname:short)"]).await?;
    Ok(output.lines().map(|s| s.to_string()).collect())
}

/// Reads a file the fake upload tools left in the repository's git dir.
pub async fn uploaded(dir: &Path, name: &str) -> anyhow::Result<String> {
    Ok(tokio::fs::read_to_string(dir.join(".git").join(name)).await?)
}

pub fn setup_logging() -> anyhow::Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_test_writer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).init();
    Ok(())
}

// -----------------------------------------------------------------------------
// Collaborators

/// Preparer that hands out a fixed `repo` binary and touches nothing.
pub struct FakePreparer {
    pub repo_binary: PathBuf,
}

impl WorkspacePreparer for FakePreparer {
    async fn prepare(&self, _dir: &Path) -> anyhow::Result<PathBuf> {
        Ok(self.repo_binary.clone())
    }
}

/// Registrar standing in for a machine without the Google3 helper.
pub struct UnavailableRegistrar;

impl FlagRegistrar for UnavailableRegistrar {
    async fn register(&self, _workspace: &str, _flag: &FlagName) -> anyhow::Result<()> {
        anyhow::bail!("Google3 directory unavailable")
    }
}

pub enum TestDir {
    Temp(tempfile::TempDir),
    Kept(std::path::PathBuf),
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;

        if std::env::var("DEBUG_TESTS").is_ok() {
            let path = temp_dir.keep();
            eprintln!("Test directory kept at: {}", path.display());
            Ok(TestDir::Kept(path))
        } else {
            Ok(TestDir::Temp(temp_dir))
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            TestDir::Temp(t) => t.path(),
            TestDir::Kept(p) => p.as_path(),
        }
    }
}
