//! How student removal is persisted.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Student delete policy, selected with `STUDENT_DELETE_POLICY`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Mark the row inactive and stamp `deleted_at`. Inactive rows are
    /// invisible to reads and to uniqueness checks.
    #[default]
    Soft,
    /// Remove the row.
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDeletePolicyError(pub String);

impl fmt::Display for ParseDeletePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown delete policy '{}', expected 'soft' or 'hard'", self.0)
    }
}

impl std::error::Error for ParseDeletePolicyError {}

impl FromStr for DeletePolicy {
    type Err = ParseDeletePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(ParseDeletePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Soft => f.write_str("soft"),
            Self::Hard => f.write_str("hard"),
        }
    }
}

impl DeletePolicy {
    pub fn from_env() -> Self {
        match env::var("STUDENT_DELETE_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to soft delete");
                Self::Soft
            }),
            Err(_) => Self::default(),
        }
    }
}
