use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use log::warn;

use crate::App;
use crate::clients::command::CommandRunner;
use crate::clients::http::HttpTransport;
use crate::commit::CommitRecord;

fn write_commit(stdout: &mut impl std::io::Write, commit: &CommitRecord) -> std::io::Result<()> {
    writeln!(
        stdout,
        "{} {} {} {}",
        commit.short_hash.yellow(),
        commit.author_date.dimmed(),
        commit.author_name.cyan(),
        commit.message
    )
}

impl<R: CommandRunner, H: HttpTransport> App<R, H> {
    /// Print the history of a checkout, or the commits between two revisions.
    pub async fn cmd_log(
        &self,
        path: PathBuf,
        range: Option<(&str, &str)>,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let git = self.git(path);
        let commits = match range {
            Some((start, end)) => git.compare_commits(start, end).await?,
            None => git.all_commits().await?,
        };

        if commits.is_empty() {
            warn!("No commits found");
        }
        for commit in &commits {
            write_commit(stdout, commit)?;
        }
        Ok(())
    }

    pub async fn cmd_head(&self, path: PathBuf, stdout: &mut impl std::io::Write) -> Result<()> {
        match self.git(path).latest_commit().await? {
            Some(commit) => writeln!(stdout, "{commit}")?,
            None => warn!("Checkout has no HEAD commit"),
        }
        Ok(())
    }

    pub async fn cmd_remote_head(
        &self,
        path: PathBuf,
        branch: &str,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        match self.git(path).latest_remote_commit(branch).await? {
            Some(commit) => writeln!(stdout, "{commit}")?,
            None => warn!("Branch {branch} not found on origin"),
        }
        Ok(())
    }

    pub async fn cmd_branches(
        &self,
        path: PathBuf,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        for branch in self.git(path).branches().await? {
            writeln!(stdout, "{branch}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::clients::command::MockCommandRunner;
    use crate::clients::http::MockHttpTransport;
    use crate::commands::fixtures::app;
    use crate::commands::fixtures::git_output;

    const LOG: &str = "\
\"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa---Ann---<ann@example.com>---2024-05-01 10:00:00 +0200---Fix the build\"
\"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb---Bob---<bob@example.com>---2024-04-30 09:00:00 +0200---Initial commit\"";

    #[tokio::test]
    async fn test_log() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, _, args| args.len() == 2 && args[0] == "log")
            .times(1)
            .returning(|_, _, args| Ok(git_output(args, 0, LOG, "")));

        let app = app(runner, MockHttpTransport::new());
        let mut out = Vec::new();
        app.cmd_log(Path::new("/repo").to_path_buf(), None, &mut out)
            .await
            .unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        aaaaaaa 2024-05-01 10:00:00 Ann Fix the build
        bbbbbbb 2024-04-30 09:00:00 Bob Initial commit
        ");
    }

    #[tokio::test]
    async fn test_log_range() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, _, args| args.last().map(String::as_str) == Some("v1...v2"))
            .times(1)
            .returning(|_, _, args| Ok(git_output(args, 0, "", "")));

        let app = app(runner, MockHttpTransport::new());
        let mut out = Vec::new();
        app.cmd_log(Path::new("/repo").to_path_buf(), Some(("v1", "v2")), &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_log_malformed_output_fails() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _, args| Ok(git_output(args, 0, "\"not a commit\"", "")));

        let app = app(runner, MockHttpTransport::new());
        let mut out = Vec::new();
        let result = app
            .cmd_log(Path::new("/repo").to_path_buf(), None, &mut out)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_head_and_branches() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, _, args| args == ["rev-parse", "HEAD"])
            .times(1)
            .returning(|_, _, args| {
                Ok(git_output(args, 0, "cccccccccccccccccccccccccccccccccccccccc\n", ""))
            });
        runner
            .expect_run()
            .withf(|_, _, args| args == ["ls-remote", "--heads", "origin"])
            .times(2)
            .returning(|_, _, args| {
                Ok(git_output(
                    args,
                    0,
                    "dddddddddddddddddddddddddddddddddddddddd\trefs/heads/main\n\
                     eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee\trefs/heads/release\n",
                    "",
                ))
            });

        let app = app(runner, MockHttpTransport::new());
        let path = Path::new("/repo");
        let mut out = Vec::new();
        app.cmd_head(path.to_path_buf(), &mut out).await.unwrap();
        app.cmd_remote_head(path.to_path_buf(), "release", &mut out)
            .await
            .unwrap();
        app.cmd_branches(path.to_path_buf(), &mut out).await.unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        cccccccccccccccccccccccccccccccccccccccc
        eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee
        main
        release
        ");
    }
}
