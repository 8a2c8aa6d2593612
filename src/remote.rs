use std::fmt::Display;

use crate::error::Error;
use crate::error::Result;

const SCHEME_DELIMITER: &str = "://";
const SCP_DELIMITER: &str = "@";

/// Host of the only provider whose URL conventions we understand.
pub const GITHUB_HOST: &str = "github.com";

/// Which of the two accepted URL conventions a remote was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `protocol://host/org/repo`
    Url,
    /// `user@host:org/repo`
    Scp,
}

/// A repository URL split into its addressing parts.
///
/// Recomputed from the URL string whenever it is needed. For scp-style
/// remotes `protocol` holds the user part (usually `git`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub addressing: Addressing,
    pub protocol: String,
    pub host: String,
    pub organization: String,
    pub repository: String,
}

impl RemoteDescriptor {
    /// Parse `protocol://host/org/repo` or scp-style `user@host:org/repo`.
    ///
    /// The `@` form is picked only when the URL has an `@` and no `://`, so
    /// `https://token@github.com/org/repo` still parses as a scheme URL. The
    /// repository segment is taken as-is: a `.git` suffix or trailing path
    /// segments are left for the caller to canonicalize.
    pub fn parse(url: &str) -> Result<Self> {
        let malformed = || Error::MalformedUrl {
            url: url.to_string(),
        };

        let scp_style = url.contains(SCP_DELIMITER) && !url.contains(SCHEME_DELIMITER);
        let delimiter = if scp_style {
            SCP_DELIMITER
        } else {
            SCHEME_DELIMITER
        };

        let (protocol, rest) = url.split_once(delimiter).ok_or_else(malformed)?;
        let rest = if scp_style {
            // host:org/repo
            rest.replacen(':', "/", 1)
        } else {
            rest.to_string()
        };

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() < 3 || segments[..3].iter().any(|s| s.is_empty()) {
            return Err(malformed());
        }

        Ok(Self {
            addressing: if scp_style {
                Addressing::Scp
            } else {
                Addressing::Url
            },
            protocol: protocol.to_string(),
            host: segments[0].to_string(),
            organization: segments[1].to_string(),
            repository: segments[2].to_string(),
        })
    }

    pub fn is_github(&self) -> bool {
        self.host
            .rsplit('@')
            .next()
            .is_some_and(|host| host.eq_ignore_ascii_case(GITHUB_HOST))
    }
}

impl Display for RemoteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.addressing {
            Addressing::Url => write!(
                f,
                "{}://{}/{}/{}",
                self.protocol, self.host, self.organization, self.repository
            ),
            Addressing::Scp => write!(
                f,
                "{}@{}:{}/{}",
                self.protocol, self.host, self.organization, self.repository
            ),
        }
    }
}
