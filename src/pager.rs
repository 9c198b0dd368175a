//! Offset-based paging with look-ahead. A [`Pager`] asks its [`ItemSource`]
//! for one item more than a page holds; the presence of that extra item is
//! what makes [`Pager::has_more`] true, so no count query is needed.
//!
//! Pagers are built once per view and populate themselves on first access.
//! A failed fetch is logged and recorded (see [`Pager::failure`]) and the
//! page renders as empty.

use crate::query::{keys, QueryParams};
use crate::store;
use std::sync::OnceLock;
use tracing::{debug, error};

/// Fetches a window of an ordered collection.
pub trait ItemSource<T> {
    /// Returns up to `limit` items, skipping the first `offset`.
    fn fetch(&self, offset: usize, limit: usize) -> store::Result<Vec<T>>;
}

impl<T, F> ItemSource<T> for F
where
    F: Fn(usize, usize) -> store::Result<Vec<T>>,
{
    fn fetch(&self, offset: usize, limit: usize) -> store::Result<Vec<T>> {
        self(offset, limit)
    }
}

/// One page of items over an [`ItemSource`].
pub struct Pager<T, S> {
    source: S,

    /// Zero-based page index.
    page: usize,

    /// Maximum number of items on a page.
    length: usize,

    /// The URL of the first page, used for navigation links.
    base_url: Option<String>,

    window: OnceLock<Window<T>>,
}

/// The populated state of a [`Pager`].
struct Window<T> {
    items: Vec<T>,
    more: bool,
    failure: Option<String>,
}

impl<T, S: ItemSource<T>> Pager<T, S> {
    pub fn new(source: S, page: usize, length: usize) -> Pager<T, S> {
        Pager {
            source,
            page,
            length,
            base_url: None,
            window: OnceLock::new(),
        }
    }

    /// Sets the URL that [`Pager::next_link`] and [`Pager::prev_link`]
    /// extend with a `page` parameter.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Pager<T, S> {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.length)
    }

    /// The items on this page, at most [`Pager::length`] of them.
    pub fn items(&self) -> &[T] {
        &self.window().items
    }

    /// Whether the source had items past the end of this page.
    pub fn has_more(&self) -> bool {
        self.window().more
    }

    /// The error message of a failed fetch, if the page degraded to empty.
    pub fn failure(&self) -> Option<&str> {
        self.window().failure.as_deref()
    }

    pub fn home_link(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The next page's URL, if there is a next page.
    pub fn next_link(&self) -> Option<String> {
        if !self.has_more() {
            return None;
        }
        self.link(self.page.checked_add(1)?)
    }

    /// The previous page's URL, if this is not the first page. The first
    /// page is linked without a `page` parameter.
    pub fn prev_link(&self) -> Option<String> {
        match self.page {
            0 => None,
            page => self.link(page - 1),
        }
    }

    fn link(&self, page: usize) -> Option<String> {
        let mut url = self.base_url.clone()?;
        let mut params = QueryParams::new();
        if page > 0 {
            params.push(keys::PAGE, page.to_string());
        }
        params.append_to(&mut url);
        Some(url)
    }

    fn window(&self) -> &Window<T> {
        self.window.get_or_init(|| self.populate())
    }

    fn populate(&self) -> Window<T> {
        let offset = self.offset();
        match self.source.fetch(offset, self.length.saturating_add(1)) {
            Ok(mut items) => {
                let more = items.len() > self.length;
                items.truncate(self.length);
                debug!(
                    page = self.page,
                    offset,
                    count = items.len(),
                    more,
                    "populated pager"
                );
                Window {
                    items,
                    more,
                    failure: None,
                }
            }
            Err(err) => {
                error!(page = self.page, offset, error = %err, "fetching pager items");
                Window {
                    items: Vec::new(),
                    more: false,
                    failure: Some(err.to_string()),
                }
            }
        }
    }
}
