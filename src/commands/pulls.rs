use anyhow::Result;
use colored::Colorize;
use futures_util::future::join_all;
use log::warn;

use crate::App;
use crate::clients::command::CommandRunner;
use crate::clients::github::PullRequestSummary;
use crate::clients::http::HttpTransport;

fn write_pull_request(
    stdout: &mut impl std::io::Write,
    pr: &PullRequestSummary,
) -> std::io::Result<()> {
    let number = format!("#{}", pr.number);
    writeln!(
        stdout,
        "{} {} {}",
        number.green(),
        pr.short_commit.yellow(),
        pr.title
    )
}

impl<R: CommandRunner, H: HttpTransport> App<R, H> {
    pub async fn cmd_prs(&self, url: &str, stdout: &mut impl std::io::Write) -> Result<()> {
        let prs = self.gh.fetch_pull_requests(url, self.token()).await?;
        if prs.is_empty() {
            warn!("No open pull requests");
        }
        for pr in &prs {
            write_pull_request(stdout, pr)?;
        }
        Ok(())
    }

    /// Print several pull requests, fetched concurrently.
    pub async fn cmd_pr(
        &self,
        url: &str,
        numbers: &[u64],
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let token = self.token();
        let lookups = numbers
            .iter()
            .map(|&number| self.gh.get_pull_request(url, number, token));
        let prs = join_all(lookups).await;

        for (number, pr) in numbers.iter().zip(prs) {
            match pr {
                Some(pr) => write_pull_request(stdout, &pr)?,
                None => warn!("Pull request #{number} not available"),
            }
        }
        Ok(())
    }

    pub async fn cmd_merge(
        &self,
        url: &str,
        number: u64,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let token = self.require_token()?;
        let outcome = self.gh.merge_pull_request(url, number, token).await;

        match (outcome.sha, outcome.error) {
            (Some(sha), _) => {
                let short: String = sha.chars().take(crate::commit::SHORT_HASH_LENGTH).collect();
                writeln!(stdout, "{} #{} as {}", "Merged".green(), number, short.yellow())?;
                if let Some(message) = outcome.message {
                    writeln!(stdout, "  {}", message.dimmed())?;
                }
                Ok(())
            }
            (None, error) => {
                let error = error.unwrap_or_else(|| "unknown error".to_string());
                anyhow::bail!("Merge of #{number} failed: {error}")
            }
        }
    }
}
