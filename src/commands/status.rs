use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::clients::command::CommandRunner;
use crate::clients::github::CommitState;
use crate::clients::github::StatusOutcome;
use crate::clients::http::HttpTransport;
use crate::commit::SHORT_HASH_LENGTH;

impl<R: CommandRunner, H: HttpTransport> App<R, H> {
    /// Report a build state on a commit.
    pub async fn cmd_status(
        &self,
        url: &str,
        commit: &str,
        state: CommitState,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let token = self.require_token()?;
        let outcome = self
            .gh
            .update_commit_status(url, commit, state, token)
            .await;

        let ack = match outcome {
            StatusOutcome::Acknowledged(ack) => ack,
            StatusOutcome::Failed { error } => {
                anyhow::bail!("Status update for {commit} failed: {error}")
            }
        };

        let state = match ack.state {
            CommitState::Success => ack.state.to_string().green(),
            CommitState::Pending => ack.state.to_string().yellow(),
            CommitState::Failure | CommitState::Error => ack.state.to_string().red(),
        };
        let short: String = commit.chars().take(SHORT_HASH_LENGTH).collect();
        let context = ack
            .context
            .unwrap_or_else(|| self.config.status_context.clone());
        writeln!(stdout, "{} {} {}", state, short.yellow(), context.dimmed())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::command::MockCommandRunner;
    use crate::clients::github::CommitState;
    use crate::clients::http::HttpResponse;
    use crate::clients::http::Method;
    use crate::clients::http::MockHttpTransport;
    use crate::commands::fixtures::allow_rate_limit;
    use crate::commands::fixtures::app;

    const COMMIT: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

    #[tokio::test]
    async fn test_status() {
        let mut http = MockHttpTransport::new();
        allow_rate_limit(&mut http);
        http.expect_send()
            .withf(|request| {
                request.method == Method::Post
                    && request.url.ends_with(&format!("/repos/org/repo/statuses/{COMMIT}"))
            })
            .times(1)
            .returning(|request| {
                let body = request.body.unwrap_or_default();
                assert!(body.contains(r#""state":"success""#));
                Ok(HttpResponse {
                    status: 201,
                    body: r#"{"id":1,"state":"success","target_url":"http://localhost:8080","description":"success","context":"continuous-integration/ficion"}"#.to_string(),
                })
            });

        let app = app(MockCommandRunner::new(), http);
        let mut out = Vec::new();
        app.cmd_status("https://github.com/org/repo", COMMIT, CommitState::Success, &mut out)
            .await
            .unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @"success 6dcb09b continuous-integration/ficion");
    }

    #[tokio::test]
    async fn test_status_failure() {
        let mut http = MockHttpTransport::new();
        allow_rate_limit(&mut http);
        http.expect_send()
            .withf(|request| request.url.contains("/statuses/"))
            .times(1)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 422,
                    body: r#"{"message":"No commit found for SHA: nope"}"#.to_string(),
                })
            });

        let app = app(MockCommandRunner::new(), http);
        let mut out = Vec::new();
        let err = app
            .cmd_status("https://github.com/org/repo", "nope", CommitState::Pending, &mut out)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Status update for nope failed: No commit found for SHA: nope"
        );
    }
}
