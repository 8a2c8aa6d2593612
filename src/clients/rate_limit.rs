//! Pre-flight rate-limit check for GitHub API calls.
//!
//! Every gated call first asks `/rate_limit` how much quota is left. When none
//! is, the caller must skip its request altogether: there is no waiting and no
//! retry. Snapshots are never cached, so a check always reflects the quota at
//! the moment the dependent call is about to be made.

use std::fmt::Display;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

use super::github::ApiReply;
use super::github::ProviderConfig;
use super::http::HttpTransport;
use super::http::Method;
use crate::error::Error;
use crate::error::Result;

// -----------------------------------------------------------------------------
// Types

/// Quota state as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    pub remaining: u64,
    pub limit: u64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitSnapshot {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Display for RateLimitSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} requests left, resets at {}",
            self.remaining, self.limit, self.reset_at
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed(RateLimitSnapshot),
    Blocked(RateLimitSnapshot),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitBody {
    rate: Rate,
}

#[derive(Debug, Deserialize)]
struct Rate {
    limit: u64,
    remaining: u64,
    /// Unix timestamp
    reset: i64,
}

impl From<Rate> for RateLimitSnapshot {
    fn from(rate: Rate) -> Self {
        Self {
            remaining: rate.remaining,
            limit: rate.limit,
            reset_at: DateTime::from_timestamp(rate.reset, 0).unwrap_or_default(),
        }
    }
}

// -----------------------------------------------------------------------------
// RateLimitGate

pub struct RateLimitGate<'a, H> {
    config: &'a ProviderConfig,
    http: &'a H,
}

impl<'a, H: HttpTransport> RateLimitGate<'a, H> {
    pub fn new(config: &'a ProviderConfig, http: &'a H) -> Self {
        Self { config, http }
    }

    /// Fetch a fresh snapshot and decide whether a call may go ahead.
    ///
    /// The token is forwarded so the snapshot describes the quota of the
    /// identity that will make the gated call.
    #[instrument(skip_all)]
    pub async fn check(&self, token: Option<&str>) -> Result<GateDecision> {
        let request = self.config.request(Method::Get, "/rate_limit", token);
        let response = self.http.send(request).await.map_err(Error::transport)?;

        let snapshot: RateLimitSnapshot = match ApiReply::<RateLimitBody>::decode(&response)? {
            ApiReply::Success(body) => body.rate.into(),
            ApiReply::Failure(err) => return Err(err.into_error(response.status)),
        };

        if snapshot.is_exhausted() {
            warn!(%snapshot, "hit rate limit");
            Ok(GateDecision::Blocked(snapshot))
        } else {
            debug!(%snapshot, "rate limit OK");
            Ok(GateDecision::Allowed(snapshot))
        }
    }

    /// Like [`Self::check`], but a blocked gate is an error.
    ///
    /// Any failure of the check itself also keeps the gate shut.
    pub async fn ensure_allowed(&self, token: Option<&str>) -> Result<RateLimitSnapshot> {
        match self.check(token).await? {
            GateDecision::Allowed(snapshot) => Ok(snapshot),
            GateDecision::Blocked(snapshot) => Err(Error::RateLimitExceeded(snapshot)),
        }
    }
}
