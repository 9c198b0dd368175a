use crate::calendar::{CalendarModel, CalendarRequest, DEFAULT_TITLE_LENGTH};
use crate::pager::{ItemSource, Pager};
use crate::store::EntryStore;
use crate::url::{ContextUrls, UrlStrategy};
use crate::util::{open, read_to_string};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "weblinks.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct TitleLength(usize);
impl Default for TitleLength {
    fn default() -> Self {
        TitleLength(DEFAULT_TITLE_LENGTH)
    }
}

#[derive(Deserialize)]
struct Project {
    absolute_context_url: Url,

    #[serde(default)]
    relative_context_url: String,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default)]
    calendar_title_length: TitleLength,

    #[serde(default)]
    log_level: Option<String>,

    #[serde(default)]
    smileys: Option<PathBuf>,
}

pub struct Config {
    pub context_urls: ContextUrls,

    /// Entries per page for pagers built by [`Config::pager`].
    pub page_size: usize,

    /// Title length for calendars built by [`Config::calendar`].
    pub calendar_title_length: usize,

    pub log_level: Option<String>,

    /// The smiley definitions file, resolved against the project directory.
    pub smileys: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            context_urls: ContextUrls::new("http://localhost:8080", ""),
            page_size: PageSize::default().0,
            calendar_title_length: DEFAULT_TITLE_LENGTH,
            log_level: None,
            smileys: None,
        }
    }
}

impl Config {
    /// Returns the nearest project file at or above `dir`.
    pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|dir| dir.join(PROJECT_FILE))
            .find(|path| path.exists())
    }

    pub fn from_directory(dir: &Path) -> Result<Config> {
        match Config::find_project_file(dir) {
            Some(path) => match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            },
            None => Err(anyhow!(
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            )),
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        if project.page_size.0 == 0 {
            return Err(anyhow!("`page_size` in '{}' must be positive", path.display()));
        }
        if project.absolute_context_url.cannot_be_a_base() {
            return Err(anyhow!(
                "`absolute_context_url` in '{}' must be a hierarchical URL, found `{}`",
                path.display(),
                project.absolute_context_url
            ));
        }

        Ok(Config {
            context_urls: ContextUrls::new(
                project.absolute_context_url.as_str(),
                &project.relative_context_url,
            ),
            page_size: project.page_size.0,
            calendar_title_length: project.calendar_title_length.0,
            log_level: project.log_level,
            smileys: project.smileys.map(|relpath| project_root.join(relpath)),
        })
    }

    /// The strategy for published pages, or for the authoring preview with
    /// an optional forced theme.
    pub fn url_strategy(&self, preview: bool, theme: Option<&str>) -> UrlStrategy {
        match preview {
            true => UrlStrategy::preview(self.context_urls.clone(), theme),
            false => UrlStrategy::normal(self.context_urls.clone()),
        }
    }

    /// A pager over `source` holding the configured number of items.
    pub fn pager<T, S: ItemSource<T>>(&self, source: S, page: usize) -> Pager<T, S> {
        Pager::new(source, page, self.page_size)
    }

    /// Loads a calendar that shortens titles to the configured length.
    pub fn calendar<'a, S: EntryStore + ?Sized>(
        &self,
        strategy: &'a UrlStrategy,
        request: CalendarRequest<'a>,
        store: &S,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarModel<'a> {
        CalendarModel::load(strategy, request, store, start, end)
            .with_title_length(self.calendar_title_length)
    }

    /// Reads the configured smiley definitions, if any.
    pub fn smiley_definitions(&self) -> Result<Option<String>> {
        match &self.smileys {
            Some(path) => Ok(Some(read_to_string(path, "smileys")?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store;
    use crate::url::{ContextRoot, RenderingContext};
    use crate::weblog::{Entry, Weblog};
    use std::fs;

    fn write_project(dir: &Path, contents: &str) -> Result<()> {
        fs::write(dir.join(PROJECT_FILE), contents)?;
        Ok(())
    }

    #[test]
    fn test_from_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "absolute_context_url: https://blogs.example.org/roller/\n\
             relative_context_url: /roller/\n\
             page_size: 25\n\
             smileys: theme/smileys.yaml\n",
        )?;
        let config = Config::from_project_file(&dir.path().join(PROJECT_FILE))?;
        assert_eq!("https://blogs.example.org/roller", config.context_urls.absolute_url());
        assert_eq!("/roller", config.context_urls.relative_url());
        assert_eq!(25, config.page_size);
        assert_eq!(DEFAULT_TITLE_LENGTH, config.calendar_title_length);
        assert_eq!(None, config.log_level);
        assert_eq!(
            Some(dir.path().join("theme/smileys.yaml")),
            config.smileys
        );
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "absolute_context_url: https://example.org\nlog_level: debug\n",
        )?;
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested)?;
        let config = Config::from_directory(&nested)?;
        assert_eq!("https://example.org", config.context_urls.absolute_url());
        assert_eq!("", config.context_urls.relative_url());
        assert_eq!(Some("debug".to_owned()), config.log_level);
        assert_eq!(10, config.page_size);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_page_size() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(dir.path(), "absolute_context_url: https://example.org\npage_size: 0\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_url() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(dir.path(), "absolute_context_url: not a url\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        write_project(dir.path(), "absolute_context_url: \"mailto:me@example.org\"\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_pager_and_calendar_use_configured_sizes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "absolute_context_url: https://example.org
             page_size: 3
             calendar_title_length: 8
",
        )?;
        let config = Config::from_directory(dir.path())?;

        let pager = config.pager(
            |offset: usize, limit: usize| -> store::Result<Vec<usize>> {
                Ok((0..10).skip(offset).take(limit).collect())
            },
            1,
        );
        assert_eq!(3, pager.length());
        assert_eq!(&[3, 4, 5], pager.items());

        struct NoEntries;
        impl EntryStore for NoEntries {
            fn published_entries(
                &self,
                _: &crate::store::EntryQuery<'_>,
            ) -> store::Result<Vec<Entry>> {
                Ok(Vec::new())
            }
        }
        let weblog = Weblog::new("myblog");
        let strategy = config.url_strategy(false, None);
        let now = Utc::now();
        let calendar = config.calendar(
            &strategy,
            CalendarRequest::new(&weblog),
            &NoEntries,
            now,
            now,
        );
        assert_eq!(8, calendar.title_length());
        assert_eq!(None, calendar.failure());
        Ok(())
    }

    #[test]
    fn test_url_strategy_context() {
        let config = Config::default();
        assert_eq!(&RenderingContext::Normal, config.url_strategy(false, None).context());
        assert_eq!(
            &RenderingContext::Preview {
                theme: Some("sotto".to_owned())
            },
            config.url_strategy(true, Some("sotto")).context()
        );
    }

    #[test]
    fn test_smiley_definitions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "absolute_context_url: https://example.org\nsmileys: smileys.yaml\n",
        )?;
        fs::write(dir.path().join("smileys.yaml"), "\":-)\": smile.gif\n")?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(
            Some("\":-)\": smile.gif\n".to_owned()),
            config.smiley_definitions()?
        );
        assert_eq!(None, Config::default().smiley_definitions()?);
        Ok(())
    }
}
