//! Converts ASCII emoticons in entry text into `<img>` tags.
//!
//! The glyph table is process-wide: [`init`] builds it once, from the
//! built-in definitions or a YAML override, and it is read-only afterwards.
//! Rendering before [`init`] leaves text untouched.

use pulldown_cmark::escape::escape_html;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// The built-in glyph definitions.
pub const BUILTIN_DEFINITIONS: &str = include_str!("smileys.yaml");

static SMILEYS: OnceLock<Smileys> = OnceLock::new();

/// A compiled glyph table.
#[derive(Debug)]
pub struct Smileys {
    /// Matches any glyph, longest alternatives first. `None` when the table
    /// is empty.
    pattern: Option<Regex>,

    /// Glyph to `<img>` tag.
    tags: HashMap<String, String>,
}

impl Smileys {
    /// A table that matches nothing.
    pub fn empty() -> Smileys {
        Smileys {
            pattern: None,
            tags: HashMap::new(),
        }
    }

    /// Parses YAML definitions of the form `glyph: image-file`. Image URLs
    /// are rooted at `{base_url}/images/smileys/`.
    pub fn parse(definitions: &str, base_url: &str) -> Result<Smileys> {
        let definitions: BTreeMap<String, String> = serde_yaml::from_str(definitions)?;
        Smileys::from_definitions(definitions, base_url)
    }

    pub fn from_definitions(
        definitions: BTreeMap<String, String>,
        base_url: &str,
    ) -> Result<Smileys> {
        let base_url = base_url.trim_end_matches('/');
        let mut tags = HashMap::with_capacity(definitions.len());
        for (glyph, image) in definitions {
            if glyph.is_empty() {
                warn!(%image, "skipping smiley with an empty glyph");
                continue;
            }
            let mut alt = String::new();
            escape_html(&mut alt, &glyph)?;
            let tag = format!(
                "<img src=\"{}/images/smileys/{}\" class=\"smiley\" alt=\"{}\" title=\"{}\" />",
                base_url, image, alt, alt
            );
            debug!(%glyph, %tag, "smiley");
            tags.insert(glyph, tag);
        }

        if tags.is_empty() {
            return Ok(Smileys::empty());
        }

        let mut glyphs: Vec<&str> = tags.keys().map(String::as_str).collect();
        glyphs.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = glyphs
            .iter()
            .map(|glyph| regex::escape(glyph))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Smileys {
            pattern: Some(Regex::new(&alternation)?),
            tags,
        })
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Replaces every glyph in `text` with its image tag in a single pass,
    /// so generated markup is never rescanned.
    pub fn render<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, |caps: &Captures| {
                self.tags
                    .get(&caps[0])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned())
            }),
            None => Cow::Borrowed(text),
        }
    }
}

/// Installs the process-wide table and returns it. `definitions` overrides
/// [`BUILTIN_DEFINITIONS`]. Only the first successful call has any effect.
pub fn init(base_url: &str, definitions: Option<&str>) -> Result<&'static Smileys> {
    if let Some(smileys) = SMILEYS.get() {
        return Ok(smileys);
    }
    let smileys = Smileys::parse(definitions.unwrap_or(BUILTIN_DEFINITIONS), base_url)?;
    debug!(count = smileys.len(), "loaded smileys");
    Ok(SMILEYS.get_or_init(|| smileys))
}

/// The installed table, if [`init`] has succeeded.
pub fn installed() -> Option<&'static Smileys> {
    SMILEYS.get()
}

/// Renders `text` with the installed table.
pub fn render(text: &str) -> Cow<'_, str> {
    match installed() {
        Some(smileys) => smileys.render(text),
        None => Cow::Borrowed(text),
    }
}

/// The result of building a glyph table.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building a glyph table.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parsing smiley definitions: {0}")]
    Definitions(#[from] serde_yaml::Error),

    #[error("compiling smiley pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("escaping smiley glyph: {0}")]
    Escape(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    const BASE: &str = "https://example.org/roller";

    fn img(file: &str, alt: &str) -> String {
        format!(
            "<img src=\"{}/images/smileys/{}\" class=\"smiley\" alt=\"{}\" title=\"{}\" />",
            BASE, file, alt, alt
        )
    }

    #[test]
    fn test_builtin_definitions_parse() -> Result<()> {
        let smileys = Smileys::parse(BUILTIN_DEFINITIONS, BASE)?;
        assert_eq!(15, smileys.len());
        Ok(())
    }

    #[test]
    fn test_render_replaces_glyphs() -> Result<()> {
        let smileys = Smileys::parse(BUILTIN_DEFINITIONS, BASE)?;
        assert_eq!(
            format!("hi {} and {}", img("smile.gif", ":-)"), img("wink.gif", ";)")),
            smileys.render("hi :-) and ;)")
        );
        Ok(())
    }

    #[test]
    fn test_longest_glyph_wins() -> Result<()> {
        let smileys = Smileys::parse("\":)\": a.gif\n\":))\": b.gif\n", BASE)?;
        assert_eq!(img("b.gif", ":))"), smileys.render(":))"));
        Ok(())
    }

    #[test]
    fn test_alt_text_is_escaped() -> Result<()> {
        let smileys = Smileys::parse("\"<3\": heart.gif\n", BASE)?;
        assert_eq!(img("heart.gif", "&lt;3"), smileys.render("<3"));
        Ok(())
    }

    #[test]
    fn test_regex_characters_are_literal() -> Result<()> {
        let smileys = Smileys::parse("\"^_^\": happy.gif\n\"(y)\": yes.gif\n", BASE)?;
        assert_eq!("a^b (x)", smileys.render("a^b (x)"));
        assert_eq!(img("yes.gif", "(y)"), smileys.render("(y)"));
        Ok(())
    }

    #[test]
    fn test_empty_table_leaves_text() -> Result<()> {
        let smileys = Smileys::parse("{}", BASE)?;
        assert!(smileys.is_empty());
        assert!(matches!(smileys.render(":-)"), Cow::Borrowed(":-)")));
        let smileys = Smileys::parse("\"\": nothing.gif\n", BASE)?;
        assert!(smileys.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            Smileys::parse("- not\n- a map\n", BASE),
            Err(Error::Definitions(_))
        ));
    }

    #[test]
    fn test_init_installs_once() -> Result<()> {
        let first = init(BASE, Some("\":-)\": first.gif\n"))?;
        let second = init("https://other.example.org", None)?;
        assert!(std::ptr::eq(first, second));
        assert_eq!(Some(first as *const Smileys), installed().map(|s| s as *const Smileys));
        assert_eq!(first.render("x"), render("x"));
        Ok(())
    }
}
