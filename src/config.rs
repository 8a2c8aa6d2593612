use anyhow::Context;
use anyhow::Result;

use crate::clients::github::DEFAULT_API_URL;
use crate::clients::github::DEFAULT_STATUS_CONTEXT;
use crate::clients::github::DEFAULT_STATUS_TARGET_URL;
use crate::clients::github::DEFAULT_USER_AGENT;
use crate::clients::github::ProviderConfig;

/// Environment variable consulted when no token is set in git config.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub github_token: Option<String>,
    pub status_target_url: String,
    pub status_context: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            github_token: None,
            status_target_url: DEFAULT_STATUS_TARGET_URL.to_string(),
            status_context: DEFAULT_STATUS_CONTEXT.to_string(),
        }
    }
}

impl Config {
    /// Load config from git config, keeping defaults for unset keys
    pub fn load() -> Result<Self> {
        Self::load_with(|key| {
            let output = std::process::Command::new("git")
                .args(["config", "--get", key])
                .output()
                .context("Failed to execute git command")?;

            // Exit code 1 means the key is not set
            if !output.status.success() {
                return Ok(None);
            }

            let value = String::from_utf8(output.stdout)?.trim().to_string();
            Ok((!value.is_empty()).then_some(value))
        })
    }

    /// Build a config from a key lookup, e.g. `bobber.apiUrl`.
    pub fn load_with(lookup: impl Fn(&str) -> Result<Option<String>>) -> Result<Self> {
        let defaults = Self::default();
        let github_token = match lookup("bobber.githubToken")? {
            Some(token) => Some(token),
            None => std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()),
        };

        Ok(Self {
            api_url: lookup("bobber.apiUrl")?.unwrap_or(defaults.api_url),
            user_agent: lookup("bobber.userAgent")?.unwrap_or(defaults.user_agent),
            github_token,
            status_target_url: lookup("bobber.targetUrl")?.unwrap_or(defaults.status_target_url),
            status_context: lookup("bobber.statusContext")?.unwrap_or(defaults.status_context),
        })
    }

    /// Settings handed to the GitHub client.
    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            api_url: self.api_url.clone(),
            user_agent: self.user_agent.clone(),
            status_target_url: self.status_target_url.clone(),
            status_context: self.status_context.clone(),
        }
    }

    /// Default config for tests
    pub fn default_for_tests() -> Self {
        Self {
            api_url: "https://api.example.test".to_string(),
            github_token: Some("test-token".to_string()),
            ..Self::default()
        }
    }
}
