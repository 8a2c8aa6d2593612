use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// Separator between fields of [`LOG_FORMAT`].
pub const LOG_FIELD_SEPARATOR: &str = "---";

/// `git log` pretty format understood by [`decode_log`].
///
/// It is passed to git as a single argument, quotes included, so git echoes
/// the quotes around every line.
pub const LOG_FORMAT: &str = r#"--pretty=format:"%H---%an---<%ae>---%ai---%s""#;

/// Length of the abbreviated hash used for display.
pub const SHORT_HASH_LENGTH: usize = 7;

const EMAIL_BOUNDARY: &str = "---<";
const FIELD_COUNT_REASON: &str = "expected 5 fields";
const QUOTE: char = '"';

static FULL_HASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").unwrap());

/// A commit as reported by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub author_name: String,
    /// Email in angle brackets, as produced by `<%ae>`.
    pub author_email: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time of the author, zone dropped.
    pub author_date: String,
    pub message: String,
}

/// Decode the output of `git log` run with [`LOG_FORMAT`].
///
/// Records come back in log order (newest first). Empty output decodes to no
/// records. A line that does not carry all five fields fails the whole decode
/// rather than being skipped, so truncated history is never mistaken for
/// short history.
pub fn decode_log(stdout: &str) -> Result<Vec<CommitRecord>> {
    stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(decode_line)
        .collect()
}

fn decode_line(line: &str) -> Result<CommitRecord> {
    let malformed = |reason| Error::MalformedLogLine {
        line: line.to_string(),
        reason,
    };

    let (hash, rest) = line
        .split_once(LOG_FIELD_SEPARATOR)
        .ok_or_else(|| malformed(FIELD_COUNT_REASON))?;
    // The email is always bracketed, so the author name ends at the first `---<`
    let (author_name, rest) = rest
        .split_once(EMAIL_BOUNDARY)
        .ok_or_else(|| malformed(FIELD_COUNT_REASON))?;
    let fields: Vec<&str> = rest.splitn(3, LOG_FIELD_SEPARATOR).collect();
    let [email, author_date, subject] = fields[..] else {
        return Err(malformed(FIELD_COUNT_REASON));
    };
    let author_email = format!("<{email}");

    let hash = hash.strip_prefix(QUOTE).unwrap_or(hash);
    if !FULL_HASH_RE.is_match(hash) {
        return Err(malformed("commit hash is not a 40 character hex string"));
    }

    let mut date_parts = author_date.split(' ');
    let (Some(date), Some(time)) = (date_parts.next(), date_parts.next()) else {
        return Err(malformed("author date has no time component"));
    };

    let subject = subject.strip_suffix(QUOTE).unwrap_or(subject);
    // A subject containing the separator is cut there; the rest can't be
    // told apart from stray fields.
    let message = subject
        .split(LOG_FIELD_SEPARATOR)
        .next()
        .unwrap_or_default();

    Ok(CommitRecord {
        hash: hash.to_string(),
        short_hash: hash[..SHORT_HASH_LENGTH].to_string(),
        author_name: author_name.to_string(),
        author_email,
        author_date: format!("{date} {time}"),
        message: message.to_string(),
    })
}
