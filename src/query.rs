//! Canonical query-string construction. Callers collect parameters into a
//! [`QueryParams`] in the order they should be rendered and call
//! [`QueryParams::encode`] exactly once. Values are always raw (unencoded)
//! when pushed; keys come from the fixed set in [`keys`] and are never
//! escaped.

use url::form_urlencoded::byte_serialize;

/// The query parameter names understood by the weblog request parsers.
pub mod keys {
    pub const DATE: &str = "date";
    pub const CATEGORY: &str = "cat";
    pub const TAGS: &str = "tags";
    pub const PAGE: &str = "page";
    pub const THEME: &str = "theme";

    /// Distinct from every collection selector key so a preview anchor and a
    /// preview theme can travel together.
    pub const PREVIEW_ENTRY: &str = "previewEntry";
}

/// An insertion-ordered list of query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams(Vec::new())
    }

    /// Appends `key=value`. Absent values are expressed by not calling this
    /// at all.
    pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.push((key, value.into()));
    }

    /// Appends `page=<n>` only for positive page numbers.
    pub fn push_page(&mut self, page: i32) {
        if page > 0 {
            self.push(keys::PAGE, page.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the parameters as `?k=v&k=v`, or the empty string when there
    /// are none. See [`encode`].
    pub fn encode(&self) -> String {
        encode(self)
    }

    /// Appends the parameters to `url`, continuing its query string with
    /// `&` if it already has one.
    pub fn append_to(&self, url: &mut String) {
        let first = if url.contains('?') { '&' } else { '?' };
        write_pairs(&self.0, first, url);
    }
}

/// Renders `params` as a query string. Returns `""` for an empty list so
/// callers can append the result unconditionally.
pub fn encode(params: &QueryParams) -> String {
    let mut out = String::new();
    write_pairs(&params.0, '?', &mut out);
    out
}

fn write_pairs(pairs: &[(&'static str, String)], first: char, out: &mut String) {
    for (i, (key, value)) in pairs.iter().enumerate() {
        out.push(if i == 0 { first } else { '&' });
        out.push_str(key);
        out.push('=');
        out.push_str(&encode_value(value));
    }
}

/// Form-encodes a query value. Spaces become `+`; everything outside
/// `[A-Za-z0-9*-._]` is percent-escaped as UTF-8. Never fails.
pub fn encode_value(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Encodes a single path segment. Same as [`encode_value`] except spaces
/// become `%20`, since `+` is literal in a path.
pub fn encode_path(segment: &str) -> String {
    encode_value(segment).replace('+', "%20")
}

/// Encodes a tag list for the `tags/` path form: each tag is encoded on its
/// own and the results are joined with `+`, the separator the request
/// parser splits on.
pub fn encode_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|tag| encode_value(tag.as_ref()))
        .collect::<Vec<_>>()
        .join("+")
}
