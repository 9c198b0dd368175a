//! Link-building for multi-tenant weblogs. The library derives canonical,
//! query-string-minimal URLs for weblog resources and pages through
//! offset-bounded result sets. It breaks down into four pieces:
//!
//! 1. Query strings ([`crate::query`]): ordered parameters rendered once.
//! 2. URL strategies ([`crate::url`]): one function family per rendering
//!    context (published pages or the authoring preview) covering the front
//!    page, entries, collections, custom pages, and static resources.
//! 3. Pagers ([`crate::pager`], [`crate::planet`]): one look-ahead fetch per
//!    page, cached, with "more items" detection and navigation links.
//! 4. Calendars ([`crate::calendar`]): entries grouped by day in the
//!    weblog's time zone, with day and month links built from the URL
//!    strategy.
//!
//! Persistence stays outside the crate behind [`crate::store`]. Data-access
//! failures are logged and degrade to empty pages or calendars; a missing
//! weblog yields no URL. Neither ever fails a render.
//!
//! [`crate::smileys`] is an entry-text plugin that shares the same
//! process-wide, initialize-once configuration model.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod calendar;
pub mod config;
pub mod logging;
pub mod pager;
pub mod planet;
pub mod query;
pub mod smileys;
pub mod store;
pub mod url;
pub mod weblog;

mod util;
