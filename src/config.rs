//! Loads the [`Config`] that every stage of the pipeline is parameterized
//! by. Configuration comes from a `portalgen.yaml` project file; every key is
//! optional.

use crate::navbar::NavbarConfig;
use crate::parser::FeedFormat;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE_NAME: &str = "portalgen.yaml";

#[derive(Deserialize)]
struct Locales(Vec<String>);
impl Default for Locales {
    fn default() -> Self {
        Locales(vec![String::from("en"), String::from("de")])
    }
}

#[derive(Deserialize)]
struct UrlPrefix(String);
impl Default for UrlPrefix {
    fn default() -> Self {
        UrlPrefix(String::from("games"))
    }
}

#[derive(Deserialize)]
struct TrackingId(String);
impl Default for TrackingId {
    fn default() -> Self {
        TrackingId(String::from("GTM-XXXXXXX"))
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    feeds_directory: Option<PathBuf>,
    games_directory: Option<PathBuf>,

    #[serde(default)]
    locales: Locales,

    #[serde(default)]
    format: FeedFormat,

    #[serde(default)]
    url_prefix: UrlPrefix,

    template: Option<PathBuf>,

    #[serde(default)]
    tracking_id: TrackingId,

    site_url: Option<Url>,

    #[serde(default)]
    navbar: NavbarConfig,
}

/// Fully-resolved configuration. All paths are absolute or relative to the
/// working directory.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory searched for `*.xml` feed files.
    pub feeds_directory: PathBuf,

    /// The root of the generated output. Pages and index files land in
    /// `{games_directory}/{locale}/`.
    pub games_directory: PathBuf,

    /// The locales to render every game for.
    pub locales: Vec<String>,

    /// The parser applied to every feed.
    pub format: FeedFormat,

    /// The path prefix for page URLs in the index files, e.g. `games` yields
    /// `games/en/block-blast-en.html`.
    pub url_prefix: String,

    /// Replaces the built-in page template when set.
    pub template: Option<PathBuf>,

    /// The tag-manager container ID written into generated pages.
    pub tracking_id: String,

    /// The public root of the site. A `sitemap.xml` is only written when set.
    pub site_url: Option<Url>,

    pub navbar: NavbarConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config::from_project(Project::default(), Path::new(""))
    }
}

impl Config {
    /// Looks for a [`PROJECT_FILE_NAME`] in `dir` and then in each of its
    /// ancestors. Falls back to [`Config::default`] when there is none.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE_NAME);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
            current = dir.parent();
        }
        tracing::info!(
            "No `{}` found; using default configuration",
            PROJECT_FILE_NAME
        );
        Ok(Config::default())
    }

    /// Loads the project file at `path`. Relative paths inside it are
    /// resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let config = Config::from_project(project, project_root);
                if config.locales.is_empty() {
                    return Err(anyhow!("`locales` must name at least one locale"));
                }
                Ok(config)
            }
        }
    }

    fn from_project(project: Project, project_root: &Path) -> Config {
        Config {
            feeds_directory: project_root
                .join(project.feeds_directory.unwrap_or_else(|| PathBuf::from("feeds"))),
            games_directory: project_root
                .join(project.games_directory.unwrap_or_else(|| PathBuf::from("games"))),
            locales: project.locales.0,
            format: project.format,
            url_prefix: project.url_prefix.0,
            template: project.template.map(|relpath| project_root.join(relpath)),
            tracking_id: project.tracking_id.0,
            site_url: project.site_url,
            navbar: project.navbar,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(PathBuf::from("feeds"), config.feeds_directory);
        assert_eq!(PathBuf::from("games"), config.games_directory);
        assert_eq!(vec!["en", "de"], config.locales);
        assert_eq!(FeedFormat::Lenient, config.format);
        assert_eq!("games", config.url_prefix);
        assert!(config.site_url.is_none());
    }

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let root = TempDir::new()?;
        fs::write(
            root.path().join(PROJECT_FILE_NAME),
            "feeds_directory: input\nlocales: [fr]\nformat: strict\ntemplate: theme/page.hbs\n",
        )?;
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(root.path().join("input"), config.feeds_directory);
        assert_eq!(root.path().join("games"), config.games_directory);
        assert_eq!(vec!["fr"], config.locales);
        assert_eq!(FeedFormat::Strict, config.format);
        assert_eq!(Some(root.path().join("theme/page.hbs")), config.template);
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_keys() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join(PROJECT_FILE_NAME);
        fs::write(&path, "feed_dir: typo\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_errors_name_the_project_file() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join(PROJECT_FILE_NAME);
        fs::write(&path, "locales: fr\n")?;
        let message = Config::from_directory(root.path()).unwrap_err().to_string();
        assert!(message.starts_with("Parsing project file `"));
        assert!(message.contains(PROJECT_FILE_NAME));

        let missing = Config::from_project_file(&root.path().join("absent.yaml")).unwrap_err();
        assert!(missing.to_string().starts_with("Opening project file `"));
        Ok(())
    }

    #[test]
    fn test_rejects_empty_locales() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join(PROJECT_FILE_NAME);
        fs::write(&path, "locales: []\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }
}
