//! Query parameters and issues URL construction.
//!
//! The `since` filter is computed from a lookback window against the local calendar date.
//! Month and day are written without zero padding (`2024-9-3`), which the GitHub API accepts.

use crate::error::IssuesError;
use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPOSITORY: &str = "angular";
pub const DEFAULT_OWNER: &str = "angular";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// The user-editable inputs of an issues search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    /// The repository name (e.g., "angular").
    pub repository: String,
    /// The owner of the repository (e.g., "angular").
    pub owner: String,
    /// Number of days back from today used as the `since` filter.
    pub lookback_days: i64,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// A partial update of [`QueryParameters`]; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryUpdate {
    pub repository: Option<String>,
    pub owner: Option<String>,
    pub lookback_days: Option<i64>,
}

impl QueryParameters {
    /// Rejects parameters that cannot form a request path.
    pub fn validate(&self) -> Result<(), IssuesError> {
        if self.owner.trim().is_empty() {
            return Err(IssuesError::InvalidParameters(
                "owner must not be empty".to_string(),
            ));
        }
        if self.repository.trim().is_empty() {
            return Err(IssuesError::InvalidParameters(
                "repository must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The calendar date `lookback_days` before `today`. Negative windows yield future dates.
    ///
    /// Returns `None` when the result falls outside the representable date range.
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        TimeDelta::try_days(self.lookback_days).and_then(|window| today.checked_sub_signed(window))
    }

    /// Builds the issues URL for these parameters relative to `today`.
    ///
    /// Owner and repository are inserted verbatim.
    pub fn issues_url(&self, api_base: &str, today: NaiveDate) -> Result<String, IssuesError> {
        self.validate()?;

        if self.lookback_days < 0 {
            tracing::warn!(
                lookback_days = self.lookback_days,
                "Negative lookback window, since date is in the future"
            );
        }

        let since = self.since(today).ok_or_else(|| {
            IssuesError::InvalidParameters(format!(
                "lookback of {} days is out of range",
                self.lookback_days
            ))
        })?;

        Ok(format!(
            "{}/repos/{}/{}/issues?since={}",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repository,
            format_since(since)
        ))
    }
}

/// Formats a date as `YYYY-M-D`.
pub fn format_since(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Parses a lookback window typed in as text.
pub fn parse_lookback_days(input: &str) -> Result<i64, IssuesError> {
    input.trim().parse::<i64>().map_err(|_| {
        IssuesError::InvalidParameters(format!("lookback days must be an integer, got '{input}'"))
    })
}

/// Today's date on the local clock.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
