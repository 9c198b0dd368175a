//! Calendar views of a weblog. A [`CalendarModel`] loads every published
//! entry in a date range once, groups the entries by calendar day in the
//! weblog's time zone, and then answers per-day questions: which entries,
//! which link, and what HTML goes into the day's cell.
//!
//! Nothing here fails outright. A failed load leaves the calendar empty and
//! a failed cell renders as nothing; both are logged.

use crate::store::{EntryQuery, EntryStore};
use crate::url::{ContextRoot, ContextUrls, Selector, UrlStrategy};
use crate::weblog::{Entry, Weblog};
use chrono::{DateTime, NaiveDate, Utc};
use pulldown_cmark::escape::escape_html;
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use tracing::{debug, error};

/// The default maximum length of an entry title in a day cell.
pub const DEFAULT_TITLE_LENGTH: usize = 20;

const DAY_FORMAT: &str = "%Y%m%d";
const MONTH_FORMAT: &str = "%Y%m";

/// What a calendar is being rendered for.
#[derive(Clone, Copy, Debug)]
pub struct CalendarRequest<'a> {
    pub weblog: &'a Weblog,
    pub locale: Option<&'a str>,

    /// Restricts entries and links to one category.
    pub category: Option<&'a str>,

    /// The custom page the calendar is displayed on. Month navigation links
    /// stay on this page.
    pub page_link: Option<&'a str>,
}

impl<'a> CalendarRequest<'a> {
    pub fn new(weblog: &'a Weblog) -> CalendarRequest<'a> {
        CalendarRequest {
            weblog,
            locale: None,
            category: None,
            page_link: None,
        }
    }
}

/// Published entries grouped by day, plus the links derived from them.
pub struct CalendarModel<'a, C = ContextUrls> {
    request: CalendarRequest<'a>,
    strategy: &'a UrlStrategy<C>,

    /// Entries per local day, each list ordered by publish time.
    days: BTreeMap<NaiveDate, Vec<Entry>>,

    title_length: usize,
    failure: Option<String>,
}

impl<'a, C: ContextRoot> CalendarModel<'a, C> {
    /// Loads the published entries in `[start, end)` for the request's
    /// weblog, category, and locale.
    pub fn load<S: EntryStore + ?Sized>(
        strategy: &'a UrlStrategy<C>,
        request: CalendarRequest<'a>,
        store: &S,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarModel<'a, C> {
        let query = EntryQuery {
            weblog: request.weblog,
            start,
            end,
            category: request.category,
            locale: request.locale,
        };
        let (entries, failure) = match store.published_entries(&query) {
            Ok(entries) => (entries, None),
            Err(err) => {
                error!(
                    weblog = %request.weblog.handle,
                    error = %err,
                    "loading calendar entries"
                );
                (Vec::new(), Some(err.to_string()))
            }
        };
        let days = group_by_day(request.weblog, entries);
        debug!(
            weblog = %request.weblog.handle,
            days = days.len(),
            "loaded calendar"
        );
        CalendarModel {
            request,
            strategy,
            days,
            title_length: DEFAULT_TITLE_LENGTH,
            failure,
        }
    }

    /// Overrides [`DEFAULT_TITLE_LENGTH`].
    pub fn with_title_length(mut self, title_length: usize) -> CalendarModel<'a, C> {
        self.title_length = title_length;
        self
    }

    /// The maximum title length, in characters, of entries in day cells.
    pub fn title_length(&self) -> usize {
        self.title_length
    }

    /// The error message of a failed load, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// The days that have entries, in order.
    pub fn days(&self) -> impl Iterator<Item = &NaiveDate> {
        self.days.keys()
    }

    /// The entries published on `day`, ordered by publish time. `None` when
    /// there are none.
    pub fn entries(&self, day: NaiveDate) -> Option<&[Entry]> {
        self.days.get(&day).map(Vec::as_slice)
    }

    /// The link for a day's title: the collection for the `YYYYMMDD` date of
    /// the day's first entry. `None` for days without entries.
    pub fn day_url(&self, day: NaiveDate) -> Option<String> {
        self.compute_url(day, false, false)
    }

    /// Computes a day or month link.
    ///
    /// Days with entries use the first entry's `YYYYMMDD` date. Otherwise
    /// there is no link unless `always` is set, in which case the date is
    /// the `YYYYMM` month of `day` for navigation links and its `YYYYMMDD`
    /// date otherwise. Navigation links on a custom page stay on that page;
    /// everything else links the weblog's collection.
    pub fn compute_url(
        &self,
        day: NaiveDate,
        navigation: bool,
        always: bool,
    ) -> Option<String> {
        let weblog = self.request.weblog;
        let date = match self.days.get(&day).and_then(|entries| entries.first()) {
            Some(first) => weblog.format_local(first.pub_time, DAY_FORMAT),
            None if !always => return None,
            None if !navigation => day.format(DAY_FORMAT).to_string(),
            None => day.format(MONTH_FORMAT).to_string(),
        };
        let selector = Selector {
            category: self.request.category,
            date: Some(date.as_str()),
            ..Selector::default()
        };
        match (navigation, self.request.page_link) {
            (true, Some(link)) => self.strategy.page_url(
                Some(weblog),
                self.request.locale,
                Some(link),
                &selector,
                false,
            ),
            _ => self.strategy.collection_url(
                Some(weblog),
                self.request.locale,
                &selector,
                false,
            ),
        }
    }

    /// The HTML for a day's cell, or `None` if it could not be built.
    pub fn content(&self, day: NaiveDate) -> Option<String> {
        match self.render_day(day) {
            Ok(html) => Some(html),
            Err(err) => {
                error!(%day, error = %err, "rendering calendar day");
                None
            }
        }
    }

    fn render_day(&self, day: NaiveDate) -> Result<String> {
        let mut html = String::new();
        let number = day.format("%d").to_string();
        match self.entries(day) {
            Some(entries) => {
                let url = self.day_url(day).ok_or(Error::MissingUrl(day))?;
                html.push_str("<div class=\"hCalendarDayTitleBig\"><a href=\"");
                escape_html(&mut html, &url)?;
                html.push_str("\">");
                html.push_str(&number);
                html.push_str("</a></div>");
                for entry in entries {
                    html.push_str("<div class=\"bCalendarDayContentBig\"><a href=\"");
                    escape_html(&mut html, &entry.permalink)?;
                    html.push_str("\">");
                    escape_html(&mut html, &entry_title(entry, self.title_length))?;
                    html.push_str("</a></div>");
                }
            }
            None => {
                html.push_str("<div class=\"hCalendarDayTitleBig\">");
                html.push_str(&number);
                html.push_str("</div><div class=\"bCalendarDayContentBig\"/>");
            }
        }
        Ok(html)
    }
}

/// Sorts entries by publish time and groups them by local day.
fn group_by_day(weblog: &Weblog, mut entries: Vec<Entry>) -> BTreeMap<NaiveDate, Vec<Entry>> {
    entries.sort_by_key(|entry| entry.pub_time);
    let mut days: BTreeMap<NaiveDate, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        days.entry(weblog.local_date(entry.pub_time))
            .or_default()
            .push(entry);
    }
    days
}

/// The title shown for an entry in a day cell: trimmed, the anchor if the
/// title is blank, and cut to `max` characters plus `...` if longer.
pub fn entry_title(entry: &Entry, max: usize) -> String {
    let title = match entry.title.trim() {
        "" => entry.anchor.as_str(),
        title => title,
    };
    match title.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &title[..end]),
        None => title.to_owned(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failure while rendering a day cell.
#[derive(Debug, Error)]
pub enum Error {
    /// A day with entries produced no link.
    #[error("no URL for calendar day {0}")]
    MissingUrl(NaiveDate),

    /// Escaping into the output buffer failed.
    #[error("escaping calendar content: {0}")]
    Escape(#[from] io::Error),
}
