use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::clients::command::CommandRunner;
use crate::clients::http::HttpTransport;

impl<R: CommandRunner, H: HttpTransport> App<R, H> {
    pub async fn cmd_checkout(
        &self,
        path: PathBuf,
        url: &str,
        branch: &str,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let result = self.git(path).sync(url, branch).await?;

        for command in &result.commands {
            let symbol = if command.success() {
                "✓".green()
            } else {
                "✗".red()
            };
            writeln!(stdout, "{} {}", symbol, command.command)?;
            if !command.success() {
                for line in command.stderr.trim().lines() {
                    writeln!(stdout, "  {}", line.dimmed())?;
                }
            }
        }

        let elapsed = result.finish_time - result.start_time;
        let summary = format!("Finished in {}ms", elapsed.num_milliseconds());
        writeln!(stdout, "{}", summary.dimmed())?;

        if !result.success() {
            let status = result
                .status
                .map_or_else(|| "signal".to_string(), |code| code.to_string());
            anyhow::bail!("Checkout of {branch} failed (exit status {status})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::command::MockCommandRunner;
    use crate::clients::http::MockHttpTransport;
    use crate::commands::fixtures::app;
    use crate::commands::fixtures::git_output;

    #[tokio::test]
    async fn test_checkout_clone() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, _, args| args.first().map(String::as_str) == Some("clone"))
            .times(1)
            .returning(|_, _, args| Ok(git_output(args, 0, "", "Cloning into '.'...\n")));

        let app = app(runner, MockHttpTransport::new());
        let mut out = Vec::new();
        app.cmd_checkout(
            dir.path().join("work"),
            "https://github.com/org/repo",
            "main",
            &mut out,
        )
        .await
        .unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        ✓ git clone --branch=main -- https://github.com/org/repo .
        Finished in 3000ms
        ");
    }

    #[tokio::test]
    async fn test_checkout_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, _, args| {
            Ok(git_output(
                args,
                1,
                "",
                "fatal: couldn't find remote ref gone\n",
            ))
        });

        let app = app(runner, MockHttpTransport::new());
        let mut out = Vec::new();
        let err = app
            .cmd_checkout(
                dir.path().to_path_buf(),
                "https://github.com/org/repo",
                "gone",
                &mut out,
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Checkout of gone failed (exit status 1)");
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        ✗ git pull origin gone
          fatal: couldn't find remote ref gone
        Finished in 3000ms
        ");
    }
}
