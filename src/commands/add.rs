use anyhow::Result;
use anyhow::bail;
use colored::Colorize;
use tracing::warn;

use crate::App;
use crate::app::Targets;
use crate::collaborators::FlagRegistrar;
use crate::collaborators::WorkspacePreparer;
use crate::flag::FlagName;
use crate::flag::Target;

/// Shown when no target option was given.
pub const NOTHING_TO_DO: &str = "Nothing to do. Please give me at least one of these three arguments:
  -a (--android-dir)
  -c (--chromium-dir)
  -g (--google3)";

/// What happened to each requested target.
#[derive(Debug, Default)]
pub struct Report {
    pub completed: Vec<Target>,
    pub failed: Vec<(Target, anyhow::Error)>,
}

/// Exit status when no target was requested.
pub const USAGE_STATUS: u8 = 2;

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 0 when every requested target went through, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl<P: WorkspacePreparer, R: FlagRegistrar> App<P, R> {
    /// Entry point for the command line: runs [`App::cmd_add`] and returns the
    /// process exit status.
    pub async fn run(
        &self,
        flag: &FlagName,
        targets: &Targets,
        stdout: &mut impl std::io::Write,
        stderr: &mut impl std::io::Write,
    ) -> Result<u8> {
        if targets.is_empty() {
            writeln!(stderr, "{}", NOTHING_TO_DO)?;
            return Ok(USAGE_STATUS);
        }
        let report = self.cmd_add(flag, targets, stdout, stderr).await?;
        Ok(report.exit_status())
    }

    /// Add the flag to every requested target, one after the other.
    ///
    /// A failing target does not stop the remaining ones. Failures are written
    /// to `stderr`; the closing summary on `stdout` only lists targets whose
    /// change was actually uploaded.
    pub async fn cmd_add(
        &self,
        flag: &FlagName,
        targets: &Targets,
        stdout: &mut impl std::io::Write,
        stderr: &mut impl std::io::Write,
    ) -> Result<Report> {
        if targets.is_empty() {
            bail!(NOTHING_TO_DO);
        }

        let mut report = Report::default();

        if let Some(dir) = &targets.chromium_dir {
            let outcome = self.add_to_chromium(flag, dir).await;
            record(&mut report, Target::Chromium, outcome, stderr)?;
        }
        if let Some(workspace) = &targets.google3 {
            let outcome = self.add_to_google3(flag, workspace).await;
            record(&mut report, Target::Google3, outcome, stderr)?;
        }
        if let Some(dir) = &targets.android_dir {
            let outcome = self.add_to_android(flag, dir).await;
            record(&mut report, Target::Android, outcome, stderr)?;
        }

        if !report.completed.is_empty() {
            writeln!(stdout, "CLs generated. Now go review and land them:")?;
            for target in &report.completed {
                writeln!(stdout, " * {}", target.review_url().cyan())?;
            }
        }

        Ok(report)
    }
}

fn record(
    report: &mut Report,
    target: Target,
    outcome: Result<()>,
    stderr: &mut impl std::io::Write,
) -> Result<()> {
    match outcome {
        Ok(()) => report.completed.push(target),
        Err(e) => {
            warn!("{} failed: {:#}", target, e);
            writeln!(stderr, "{} {}: {:#}", "✗".red(), target, e)?;
            report.failed.push((target, e));
        }
    }
    Ok(())
}
