//! Canonical URLs for weblog resources. [`UrlStrategy`] turns a weblog, an
//! optional locale, and a [`Resource`] into a URL string whose shape is
//!
//! ```text
//! <context root><context segment><handle>/[<locale>/][<path extras>][?<query>]
//! ```
//!
//! The selector rules for collections decide whether a category, date, or
//! tag list becomes a path segment or a query parameter; a selector never
//! shows up in both places. Every operation returns `None` when there is no
//! weblog to address and never fails otherwise.

use crate::query::{encode_path, encode_tags, keys, QueryParams};
use crate::weblog::{Weblog, CUSTOM_THEME, ROOT_CATEGORY};

/// Supplies the URL prefixes the application is mounted under.
pub trait ContextRoot {
    /// Scheme, host, and application path, e.g. `https://example.org/roller`.
    fn absolute_url(&self) -> &str;

    /// Host-relative application path, e.g. `/roller`. May be empty.
    fn relative_url(&self) -> &str;
}

/// A fixed pair of context URLs, normally read from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextUrls {
    absolute: String,
    relative: String,
}

impl ContextUrls {
    /// Builds the pair, trimming any trailing `/` so segments can be
    /// appended directly.
    pub fn new(absolute: &str, relative: &str) -> ContextUrls {
        ContextUrls {
            absolute: absolute.trim_end_matches('/').to_owned(),
            relative: relative.trim_end_matches('/').to_owned(),
        }
    }
}

impl ContextRoot for ContextUrls {
    fn absolute_url(&self) -> &str {
        &self.absolute
    }

    fn relative_url(&self) -> &str {
        &self.relative
    }
}

/// Which renderer the URLs are for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderingContext {
    /// Published weblog pages.
    Normal,

    /// The authoring preview. A theme override, when set, is forced onto
    /// every URL as a `theme` parameter.
    Preview { theme: Option<String> },
}

impl RenderingContext {
    fn segments(&self) -> &'static Segments {
        match self {
            RenderingContext::Normal => &NORMAL,
            RenderingContext::Preview { .. } => &PREVIEW,
        }
    }

    /// The forced theme, if any.
    pub fn theme(&self) -> Option<&str> {
        match self {
            RenderingContext::Normal => None,
            RenderingContext::Preview { theme } => theme.as_deref(),
        }
    }
}

/// The per-context path constants.
struct Segments {
    /// Precedes the handle on every page URL.
    weblog: &'static str,

    /// Precedes the handle on static resource URLs.
    resource: &'static str,

    /// Sits between the handle and the file path on static resource URLs.
    resource_infix: &'static str,

    /// Entry anchors are a path segment (`entry/<anchor>`) rather than the
    /// `previewEntry` parameter.
    entry_in_path: bool,
}

const NORMAL: Segments = Segments {
    weblog: "/",
    resource: "/",
    resource_infix: "resource/",
    entry_in_path: true,
};

const PREVIEW: Segments = Segments {
    weblog: "/roller-ui/authoring/preview/",
    resource: "/roller-ui/authoring/previewresource/",
    resource_infix: "",
    entry_in_path: false,
};

/// Narrows a collection to a subset of entries. `Default` selects
/// everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selector<'a> {
    /// A category name. [`ROOT_CATEGORY`] means no category.
    pub category: Option<&'a str>,

    /// A `YYYYMMDD` or `YYYYMM` date string, passed through unchanged.
    pub date: Option<&'a str>,

    /// Tag names. Empty means no tag filter.
    pub tags: &'a [String],

    /// Zero-based page number. Anything `<= 0` means the first page and is
    /// never rendered.
    pub page: i32,
}

impl<'a> Selector<'a> {
    pub fn category(category: &'a str) -> Selector<'a> {
        Selector {
            category: Some(category),
            ..Selector::default()
        }
    }

    pub fn date(date: &'a str) -> Selector<'a> {
        Selector {
            date: Some(date),
            ..Selector::default()
        }
    }

    pub fn tags(tags: &'a [String]) -> Selector<'a> {
        Selector {
            tags,
            ..Selector::default()
        }
    }

    pub fn page(mut self, page: i32) -> Selector<'a> {
        self.page = page;
        self
    }
}

/// What a URL addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource<'a> {
    /// The weblog's front page.
    Root,

    /// A single entry, by anchor.
    Entry { anchor: Option<&'a str> },

    /// A (possibly filtered, possibly paged) list of entries.
    Collection(Selector<'a>),

    /// A custom page. Without a link this is the plain collection.
    Page {
        link: Option<&'a str>,
        selector: Selector<'a>,
    },

    /// A static file uploaded to the weblog.
    File { path: &'a str },
}

/// Builds canonical URLs for one rendering context.
#[derive(Clone, Debug)]
pub struct UrlStrategy<C = ContextUrls> {
    roots: C,
    context: RenderingContext,
}

impl<C: ContextRoot> UrlStrategy<C> {
    pub fn new(roots: C, context: RenderingContext) -> UrlStrategy<C> {
        UrlStrategy { roots, context }
    }

    /// Shorthand for the published-pages strategy.
    pub fn normal(roots: C) -> UrlStrategy<C> {
        UrlStrategy::new(roots, RenderingContext::Normal)
    }

    /// Shorthand for the preview strategy with an optional forced theme.
    pub fn preview(roots: C, theme: Option<&str>) -> UrlStrategy<C> {
        UrlStrategy::new(
            roots,
            RenderingContext::Preview {
                theme: theme.map(str::to_owned),
            },
        )
    }

    pub fn context(&self) -> &RenderingContext {
        &self.context
    }

    /// Dispatches to the operation matching `resource`. Locale is ignored
    /// for [`Resource::File`].
    pub fn resolve(
        &self,
        weblog: Option<&Weblog>,
        locale: Option<&str>,
        resource: &Resource<'_>,
        absolute: bool,
    ) -> Option<String> {
        match *resource {
            Resource::Root => self.weblog_url(weblog, locale, absolute),
            Resource::Entry { anchor } => {
                self.entry_url(weblog, locale, anchor, absolute)
            }
            Resource::Collection(ref selector) => {
                self.collection_url(weblog, locale, selector, absolute)
            }
            Resource::Page { link, ref selector } => {
                self.page_url(weblog, locale, link, selector, absolute)
            }
            Resource::File { path } => self.resource_url(weblog, path, absolute),
        }
    }

    /// The weblog's front page.
    pub fn weblog_url(
        &self,
        weblog: Option<&Weblog>,
        locale: Option<&str>,
        absolute: bool,
    ) -> Option<String> {
        let mut url = self.base(weblog?, locale, absolute);
        let mut params = QueryParams::new();
        self.push_theme(&mut params);
        url.push_str(&params.encode());
        Some(url)
    }

    /// A single entry. In the normal context the anchor is a path segment;
    /// in preview it is the `previewEntry` parameter, followed by the forced
    /// theme.
    pub fn entry_url(
        &self,
        weblog: Option<&Weblog>,
        locale: Option<&str>,
        anchor: Option<&str>,
        absolute: bool,
    ) -> Option<String> {
        let mut url = self.base(weblog?, locale, absolute);
        let mut params = QueryParams::new();
        if let Some(anchor) = anchor {
            if self.context.segments().entry_in_path {
                url.push_str("entry/");
                url.push_str(&encode_path(anchor));
            } else {
                params.push(keys::PREVIEW_ENTRY, anchor);
            }
        }
        self.push_theme(&mut params);
        url.push_str(&params.encode());
        Some(url)
    }

    /// A collection of entries. At most one selector is placed in the path:
    ///
    /// 1. category alone: `category/<category>`
    /// 2. date without a category: `date/<date>`, dropping any tags
    /// 3. tags alone: `tags/<tag>+<tag>...`
    /// 4. category with a date or tags: `date` then `cat` as query
    ///    parameters; tags are dropped.
    ///
    /// `page` (if positive) and the forced theme always follow as query
    /// parameters.
    pub fn collection_url(
        &self,
        weblog: Option<&Weblog>,
        locale: Option<&str>,
        selector: &Selector<'_>,
        absolute: bool,
    ) -> Option<String> {
        let mut url = self.base(weblog?, locale, absolute);
        let mut params = QueryParams::new();

        let category = selector.category.filter(|c| *c != ROOT_CATEGORY);
        match (category, selector.date, selector.tags.is_empty()) {
            (Some(category), None, true) => {
                url.push_str("category/");
                url.push_str(&encode_path(category));
            }
            (None, Some(date), _) => {
                url.push_str("date/");
                url.push_str(date);
            }
            (None, None, false) => {
                url.push_str("tags/");
                url.push_str(&encode_tags(selector.tags));
            }
            (category, date, _) => {
                if let Some(date) = date {
                    params.push(keys::DATE, date);
                }
                if let Some(category) = category {
                    params.push(keys::CATEGORY, category);
                }
            }
        }

        params.push_page(selector.page);
        self.push_theme(&mut params);
        url.push_str(&params.encode());
        Some(url)
    }

    /// A custom page. Every selector is a query parameter here, in the
    /// order `date`, `cat`, `tags`, `page`, `theme`. Without a `link` the
    /// result is exactly [`UrlStrategy::collection_url`].
    pub fn page_url(
        &self,
        weblog: Option<&Weblog>,
        locale: Option<&str>,
        link: Option<&str>,
        selector: &Selector<'_>,
        absolute: bool,
    ) -> Option<String> {
        let link = match link {
            Some(link) => link,
            None => {
                return self.collection_url(weblog, locale, selector, absolute)
            }
        };

        let mut url = self.base(weblog?, locale, absolute);
        url.push_str("page/");
        url.push_str(link);

        let mut params = QueryParams::new();
        if let Some(date) = selector.date {
            params.push(keys::DATE, date);
        }
        if let Some(category) = selector.category {
            params.push(keys::CATEGORY, category);
        }
        if !selector.tags.is_empty() {
            // Form encoding turns the spaces into `+`, the tag separator.
            params.push(keys::TAGS, selector.tags.join(" "));
        }
        params.push_page(selector.page);
        self.push_theme(&mut params);
        url.push_str(&params.encode());
        Some(url)
    }

    /// A static file. A single leading `/` on `file_path` is dropped. The
    /// forced theme is omitted when it is the custom theme.
    pub fn resource_url(
        &self,
        weblog: Option<&Weblog>,
        file_path: &str,
        absolute: bool,
    ) -> Option<String> {
        let weblog = weblog?;
        let segments = self.context.segments();

        let mut url = String::from(self.root(absolute));
        url.push_str(segments.resource);
        url.push_str(&weblog.handle);
        url.push('/');
        url.push_str(segments.resource_infix);
        url.push_str(file_path.strip_prefix('/').unwrap_or(file_path));

        let mut params = QueryParams::new();
        match self.context.theme() {
            Some(theme) if theme != CUSTOM_THEME => params.push(keys::THEME, theme),
            _ => {}
        }
        url.push_str(&params.encode());
        Some(url)
    }

    fn root(&self, absolute: bool) -> &str {
        match absolute {
            true => self.roots.absolute_url(),
            false => self.roots.relative_url(),
        }
    }

    /// `<root><segment><handle>/[<locale>/]`
    fn base(&self, weblog: &Weblog, locale: Option<&str>, absolute: bool) -> String {
        let mut url = String::from(self.root(absolute));
        url.push_str(self.context.segments().weblog);
        url.push_str(&weblog.handle);
        url.push('/');
        if let Some(locale) = locale {
            url.push_str(locale);
            url.push('/');
        }
        url
    }

    fn push_theme(&self, params: &mut QueryParams) {
        if let Some(theme) = self.context.theme() {
            params.push(keys::THEME, theme);
        }
    }
}
