// ABOUTME: Timestamp-derived release identifiers.
// ABOUTME: Sort lexicographically in creation order and carry the skip marker convention.

use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use thiserror::Error;

/// Prefix that retires a release from listings without deleting it.
pub const SKIP_MARKER: &str = "skip-";

/// `2012-09-20_14:04:39`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseIdError {
    #[error("release id cannot be empty")]
    Empty,

    #[error("release id cannot start with the skip marker: {0}")]
    Skipped(String),

    #[error("invalid character in release id: '{0}'")]
    InvalidChar(char),
}

/// Name of one release directory under `<to>/releases`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Validate an identifier taken from a listing or from user input.
    ///
    /// The identifier must be usable as a single path segment and must survive
    /// the comma/whitespace tokenization of the remote listing.
    pub fn new(value: &str) -> Result<Self, ReleaseIdError> {
        if value.is_empty() {
            return Err(ReleaseIdError::Empty);
        }

        if value.starts_with(SKIP_MARKER) {
            return Err(ReleaseIdError::Skipped(value.to_string()));
        }

        if let Some(c) = value
            .chars()
            .find(|c| *c == '/' || *c == ',' || c.is_whitespace() || c.is_control())
        {
            return Err(ReleaseIdError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Identifier for a release created at `at`, second precision, in the
    /// wall-clock time of `at`'s zone.
    pub fn at<Tz: TimeZone>(at: DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(at.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Identifier for a release created now, in local time.
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name this release carries once rolled back from.
    pub fn skipped_name(&self) -> String {
        format!("{}{}", SKIP_MARKER, self.0)
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
