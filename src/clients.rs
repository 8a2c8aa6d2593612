//! Integration layers for the external systems that `bobber` coordinates.
//!
//! - [`command`]: runs external commands and captures their output
//! - [`git`]: checkout, history and remote queries via the git CLI
//! - [`http`]: curl-based transport for GitHub API requests
//! - [`rate_limit`]: pre-flight quota check gating every API call
//! - [`github`]: pull requests and commit statuses via the GitHub REST API
//!
//! The command and HTTP boundaries are traits with real implementations and
//! mocks for testing.

pub mod command;
pub mod git;
pub mod github;
pub mod http;
pub mod rate_limit;
