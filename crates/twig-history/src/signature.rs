//! Author and committer lines: `<name> <unix-seconds> <offset>`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Calendar format used in log output, e.g. `Sun Jun 9 12:39:40 2019`.
pub const DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y";

/// Why a signature line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("expected `<name> <timestamp> <offset>`")]
    Incomplete,
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
    #[error("invalid utc offset {0:?}")]
    Offset(String),
}

/// A parsed author or committer line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// Free text before the timestamp, usually `Name <email>`.
    pub name: String,
    /// Seconds since the unix epoch.
    pub timestamp: i64,
    /// Literal offset as recorded, e.g. `-0400`.
    pub offset: String,
}

impl Signature {
    /// The timestamp as a UTC calendar time.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// `<UTC calendar time> <offset>`, as shown on a log `Date:` line.
    ///
    /// The offset is printed as recorded and is not applied to the time.
    pub fn display_date(&self) -> String {
        // Range was checked on parse.
        let date = self
            .time()
            .map(|t| t.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        format!("{date} {}", self.offset)
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim_end().rsplitn(3, ' ');
        let (Some(offset), Some(timestamp), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SignatureError::Incomplete);
        };

        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| SignatureError::Timestamp(timestamp.to_string()))?;
        if DateTime::from_timestamp(timestamp, 0).is_none() {
            return Err(SignatureError::Timestamp(timestamp.to_string()));
        }

        let valid_offset = offset.len() == 5
            && offset.starts_with(['+', '-'])
            && offset[1..].bytes().all(|b| b.is_ascii_digit());
        if !valid_offset {
            return Err(SignatureError::Offset(offset.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            timestamp,
            offset: offset.to_string(),
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.timestamp, self.offset)
    }
}
