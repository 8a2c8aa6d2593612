use std::path;

use anyhow::Context;
use anyhow::Result;

use crate::clients::command::CommandRunner;
use crate::clients::git::GitClient;
use crate::clients::github::GithubClient;
use crate::clients::http::HttpTransport;
use crate::config::Config;

pub struct App<R, H> {
    pub config: Config,
    pub runner: R,
    pub gh: GithubClient<H>,
}

impl<R: CommandRunner, H: HttpTransport> App<R, H> {
    pub fn new(config: Config, runner: R, http: H) -> Self {
        let gh = GithubClient::new(config.provider(), http);
        Self { config, runner, gh }
    }

    /// Git client for a working directory, sharing the app's runner.
    pub fn git(&self, path: path::PathBuf) -> GitClient<&R> {
        GitClient::new(path, &self.runner)
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.config.github_token.as_deref()
    }

    /// Token for calls that GitHub only accepts authenticated.
    pub(crate) fn require_token(&self) -> Result<&str> {
        self.token().with_context(|| {
            format!(
                "No GitHub token configured. Set bobber.githubToken in git config or {}.",
                crate::config::TOKEN_ENV_VAR
            )
        })
    }
}
