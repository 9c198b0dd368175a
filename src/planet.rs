//! Paging through aggregated (planet) subscription entries. An
//! [`Aggregation`] picks the backing collection: one subscription feed, a
//! named group, or the `all` group. Group queries can be limited to entries
//! from the last few days.

use crate::pager::{ItemSource, Pager};
use crate::store::{self, PlanetStore};
use chrono::{DateTime, Duration, Utc};

/// The group that contains every subscription.
pub const ALL_GROUP: &str = "all";

/// An entry pulled from a subscribed feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionEntry {
    pub title: String,
    pub permalink: String,
    pub author: Option<String>,
    pub pub_time: DateTime<Utc>,

    /// The URL of the feed the entry came from.
    pub feed_url: String,
}

/// Which aggregated collection to page through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// A single subscription, by feed URL.
    Feed(String),

    /// A named planet group.
    Group(String),

    /// Every subscription ([`ALL_GROUP`]).
    All,
}

/// An [`ItemSource`] over a [`PlanetStore`].
pub struct PlanetEntries<P> {
    store: P,
    aggregation: Aggregation,
    since: Option<DateTime<Utc>>,
}

impl<P: PlanetStore> PlanetEntries<P> {
    pub fn new(store: P, aggregation: Aggregation) -> PlanetEntries<P> {
        PlanetEntries {
            store,
            aggregation,
            since: None,
        }
    }

    /// Limits group queries to entries published within `days` of `now`.
    /// Non-positive values leave the query unbounded. Feed queries are
    /// never limited.
    pub fn since_days(mut self, days: i32, now: DateTime<Utc>) -> PlanetEntries<P> {
        self.since = match days > 0 {
            true => now.checked_sub_signed(Duration::days(i64::from(days))),
            false => None,
        };
        self
    }

    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }
}

impl<P: PlanetStore> ItemSource<SubscriptionEntry> for PlanetEntries<P> {
    fn fetch(
        &self,
        offset: usize,
        limit: usize,
    ) -> store::Result<Vec<SubscriptionEntry>> {
        match &self.aggregation {
            Aggregation::Feed(feed_url) => {
                self.store.subscription_entries(feed_url, offset, limit)
            }
            Aggregation::Group(group) => {
                self.store.group_entries(group, self.since, offset, limit)
            }
            Aggregation::All => {
                self.store.group_entries(ALL_GROUP, self.since, offset, limit)
            }
        }
    }
}

/// A pager over planet entries.
pub type PlanetEntriesPager<P> = Pager<SubscriptionEntry, PlanetEntries<P>>;

/// Builds the pager for one page of an aggregation.
///
/// * `base_url` is the URL of the aggregation's first page.
/// * `since_days` and `now` bound group queries (see
///   [`PlanetEntries::since_days`]).
pub fn planet_pager<P: PlanetStore>(
    store: P,
    aggregation: Aggregation,
    base_url: &str,
    since_days: i32,
    now: DateTime<Utc>,
    page: usize,
    length: usize,
) -> PlanetEntriesPager<P> {
    Pager::new(
        PlanetEntries::new(store, aggregation).since_days(since_days, now),
        page,
        length,
    )
    .with_base_url(base_url)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    enum Call {
        Feed(String, usize, usize),
        Group(String, Option<DateTime<Utc>>, usize, usize),
    }

    struct FakePlanet {
        entries: Vec<SubscriptionEntry>,
        calls: RefCell<Vec<Call>>,
    }

    impl FakePlanet {
        fn with_entries(count: usize) -> FakePlanet {
            FakePlanet {
                entries: (0..count)
                    .map(|i| SubscriptionEntry {
                        title: format!("entry {}", i),
                        permalink: format!("https://feeds.example.org/{}", i),
                        author: None,
                        pub_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                        feed_url: String::from("https://feeds.example.org/atom"),
                    })
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn window(&self, offset: usize, limit: usize) -> Vec<SubscriptionEntry> {
            self.entries.iter().skip(offset).take(limit).cloned().collect()
        }
    }

    impl PlanetStore for &FakePlanet {
        fn subscription_entries(
            &self,
            feed_url: &str,
            offset: usize,
            limit: usize,
        ) -> store::Result<Vec<SubscriptionEntry>> {
            self.calls
                .borrow_mut()
                .push(Call::Feed(feed_url.to_owned(), offset, limit));
            Ok(self.window(offset, limit))
        }

        fn group_entries(
            &self,
            group: &str,
            since: Option<DateTime<Utc>>,
            offset: usize,
            limit: usize,
        ) -> store::Result<Vec<SubscriptionEntry>> {
            self.calls
                .borrow_mut()
                .push(Call::Group(group.to_owned(), since, offset, limit));
            if group == "missing" {
                return Err(store::Error::NotFound {
                    kind: "group",
                    name: group.to_owned(),
                });
            }
            Ok(self.window(offset, limit))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_feed_ignores_since_days() {
        let planet = FakePlanet::with_entries(7);
        let pager = planet_pager(
            &planet,
            Aggregation::Feed("https://feeds.example.org/atom".to_owned()),
            "/planet/",
            7,
            now(),
            1,
            3,
        );
        assert_eq!(3, pager.items().len());
        assert!(pager.has_more());
        assert_eq!(
            vec![Call::Feed("https://feeds.example.org/atom".to_owned(), 3, 4)],
            *planet.calls.borrow()
        );
    }

    #[test]
    fn test_group_with_since_days() {
        let planet = FakePlanet::with_entries(2);
        let pager = planet_pager(
            &planet,
            Aggregation::Group("rust".to_owned()),
            "/planet/rust/",
            7,
            now(),
            0,
            5,
        );
        assert_eq!(2, pager.items().len());
        assert!(!pager.has_more());
        assert_eq!(
            vec![Call::Group(
                "rust".to_owned(),
                Some(Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap()),
                0,
                6
            )],
            *planet.calls.borrow()
        );
    }

    #[test]
    fn test_all_group_unbounded() {
        let planet = FakePlanet::with_entries(10);
        let pager = planet_pager(&planet, Aggregation::All, "/planet/", 0, now(), 0, 10);
        assert_eq!(10, pager.items().len());
        assert!(!pager.has_more());
        assert_eq!(
            vec![Call::Group(ALL_GROUP.to_owned(), None, 0, 11)],
            *planet.calls.borrow()
        );
    }

    #[test]
    fn test_missing_group_degrades_to_empty() {
        let planet = FakePlanet::with_entries(10);
        let pager = planet_pager(
            &planet,
            Aggregation::Group("missing".to_owned()),
            "/planet/missing/",
            -1,
            now(),
            0,
            10,
        );
        assert!(pager.items().is_empty());
        assert!(!pager.has_more());
        assert_eq!(Some("no such group `missing`"), pager.failure());
        assert_eq!(None, pager.next_link());
    }
}
