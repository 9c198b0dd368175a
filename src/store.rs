//! The seams to the persistence layer. Entry and subscription lookups live
//! outside this crate; they are reached through [`EntryStore`] and
//! [`PlanetStore`] and are treated as synchronous.

use crate::planet::SubscriptionEntry;
use crate::weblog::{Entry, Weblog};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Criteria for a published-entries lookup.
#[derive(Clone, Copy, Debug)]
pub struct EntryQuery<'a> {
    pub weblog: &'a Weblog,

    /// Inclusive lower bound on publish time.
    pub start: DateTime<Utc>,

    /// Exclusive upper bound on publish time.
    pub end: DateTime<Utc>,

    /// Restricts results to one category, if set.
    pub category: Option<&'a str>,

    pub locale: Option<&'a str>,
}

/// Looks up published weblog entries.
pub trait EntryStore {
    /// Returns the published entries matching `query`. Ordering is not
    /// guaranteed.
    fn published_entries(&self, query: &EntryQuery<'_>) -> Result<Vec<Entry>>;
}

/// Looks up aggregated (planet) subscription entries, newest first.
pub trait PlanetStore {
    /// Returns up to `limit` entries of a single subscription feed, skipping
    /// the first `offset`.
    fn subscription_entries(
        &self,
        feed_url: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SubscriptionEntry>>;

    /// Returns up to `limit` entries of a planet group published at or after
    /// `since` (if set), skipping the first `offset`.
    fn group_entries(
        &self,
        group: &str,
        since: Option<DateTime<Utc>>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SubscriptionEntry>>;
}

/// The result of a store lookup.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed store lookup.
#[derive(Debug, Error)]
pub enum Error {
    /// The named subscription or group does not exist.
    #[error("no such {kind} `{name}`")]
    NotFound { kind: &'static str, name: String },

    /// The backend could not be reached or refused the query.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
