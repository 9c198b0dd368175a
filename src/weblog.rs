//! Defines the [`Weblog`] and [`Entry`] types. Both belong to the persistence
//! layer; this crate only reads them, and they are treated as immutable for
//! the duration of a request.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// The category name that stands for "no category". Collection URLs treat
/// it exactly like an absent category.
pub const ROOT_CATEGORY: &str = "root";

/// The theme name of a weblog-owned (custom) theme. Preview resources for
/// it are served without a `theme` parameter.
pub const CUSTOM_THEME: &str = "custom";

/// A single weblog, identified by its handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Weblog {
    /// The unique handle, used verbatim as a URL path segment.
    pub handle: String,

    /// The weblog's time zone. Calendar days are computed in this zone.
    pub time_zone: FixedOffset,

    /// The identifier of the weblog's active theme.
    pub theme: String,
}

impl Weblog {
    /// Creates a weblog in UTC using the `basic` theme.
    pub fn new(handle: impl Into<String>) -> Weblog {
        Weblog {
            handle: handle.into(),
            time_zone: Utc.fix(),
            theme: String::from("basic"),
        }
    }

    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Weblog {
        self.time_zone = time_zone;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Weblog {
        self.theme = theme.into();
        self
    }

    /// Converts an instant into the weblog's local calendar date.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.time_zone).date_naive()
    }

    /// Formats an instant in the weblog's time zone with a `strftime`
    /// pattern.
    pub fn format_local(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        instant
            .with_timezone(&self.time_zone)
            .format(pattern)
            .to_string()
    }
}

/// A published weblog entry, as far as link-building is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The entry's anchor, unique within its weblog.
    pub anchor: String,
    pub title: String,
    pub permalink: String,
    pub pub_time: DateTime<Utc>,
}
