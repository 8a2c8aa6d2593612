#![allow(async_fn_in_trait)]

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

// -----------------------------------------------------------------------------
// Types

/// Outcome of one external command.
///
/// A command that ran but failed is still `Ok`: its exit status travels in
/// `status` and the caller decides what it means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Rendered command line, e.g. `git pull origin main`.
    pub command: String,
    pub start_time: DateTime<Utc>,
    pub finish_time: DateTime<Utc>,
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Render a program and its arguments the way a shell user would type them.
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

// -----------------------------------------------------------------------------
// CommandRunner trait

/// Runs external commands in a working directory.
#[cfg_attr(test, automock)]
pub trait CommandRunner {
    /// Run `program` with `args` inside `dir` and wait for it to exit.
    ///
    /// Only a failure to launch the process is an error.
    async fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    async fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<CommandOutput> {
        (**self).run(dir, program, args).await
    }
}

// -----------------------------------------------------------------------------
// RealCommandRunner

/// Real implementation that spawns processes with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    async fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<CommandOutput> {
        let command = render_command(program, args);
        debug!(%command, dir = %dir.display(), "running command");

        let start_time = Utc::now();
        let output = Command::new(program)
            .current_dir(dir)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to execute {program} command"))?;
        let finish_time = Utc::now();

        Ok(CommandOutput {
            command,
            start_time,
            finish_time,
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let args = ["clone", "--branch=main", "https://github.com/org/repo", "."]
            .map(String::from)
            .to_vec();
        assert_eq!(
            render_command("git", &args),
            "git clone --branch=main https://github.com/org/repo ."
        );
        assert_eq!(render_command("git", &[]), "git");
    }

    #[tokio::test]
    async fn test_real_runner_reports_exit_status() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let output = RealCommandRunner
            .run(dir.path(), "git", &["--version".to_string()])
            .await?;
        assert!(output.success());
        assert!(output.stdout.starts_with("git version"));
        assert!(output.finish_time >= output.start_time);

        let output = RealCommandRunner
            .run(dir.path(), "git", &["rev-parse".to_string(), "HEAD".to_string()])
            .await?;
        assert!(!output.success());
        assert!(!output.stderr.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_real_runner_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let result = RealCommandRunner
            .run(dir.path(), "definitely-not-a-real-program-bobber", &[])
            .await;
        assert!(result.is_err());
    }
}
