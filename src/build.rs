//! Exports the [`build_site`] function which stitches together the high-level
//! steps of generating the portal: reading and parsing the feeds
//! ([`crate::parser`]), rendering a page for every game in every locale and
//! one index and one set of category listings per locale
//! ([`crate::write`]), and optionally writing the sitemap
//! ([`crate::sitemap`]).

use crate::config::Config;
use crate::game::GameRecord;
use crate::parser::{Error as ParseError, Parser};
use crate::sitemap::{write_sitemap, Error as SitemapError, SITEMAP_FILE_NAME};
use crate::slug::slugify;
use crate::write::{Error as WriteError, Writer};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// What a [`build_site`] run produced.
#[derive(Debug, Default)]
pub struct Report {
    /// The number of feed files found.
    pub feeds: usize,

    /// The number of game records across all feeds.
    pub games: usize,

    /// The number of pages written (games × locales).
    pub pages: usize,

    /// The number of categories listed in each locale.
    pub categories: usize,

    /// Feeds that couldn't be parsed, with the reason. These contributed no
    /// games.
    pub failed_feeds: Vec<(PathBuf, String)>,
}

/// Builds the portal from a [`Config`]. A feed that can't be read or parsed
/// is logged and skipped; every other failure aborts the build.
///
/// Outputs are overwritten in place. Pages for games that have disappeared
/// from the feeds are left behind.
pub fn build_site(config: &Config) -> Result<Report> {
    let mut report = Report::default();

    std::fs::create_dir_all(&config.games_directory).map_err(|err| Error::CreateOutput {
        path: config.games_directory.clone(),
        err,
    })?;

    let feed_files = Parser::feed_files(&config.feeds_directory).map_err(|err| {
        Error::Parse(ParseError::Annotated(
            format!("listing feeds in `{}`", config.feeds_directory.display()),
            Box::new(err),
        ))
    })?;
    report.feeds = feed_files.len();
    if feed_files.is_empty() {
        tracing::warn!("No XML files found in {}", config.feeds_directory.display());
        return Ok(report);
    }

    let parser = Parser::new(config.format);
    let writer = Writer::new(config)?;
    let mut all_games: Vec<GameRecord> = Vec::new();
    let mut titles_by_slug: HashMap<String, String> = HashMap::new();

    for path in feed_files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("Processing feed: {}", name);

        let games = match parser.parse_feed(&path) {
            Ok(games) => games,
            Err(e) => {
                tracing::warn!("Error parsing feed {}: {}", name, e);
                report.failed_feeds.push((path.clone(), e.to_string()));
                Vec::new()
            }
        };
        if games.is_empty() {
            tracing::info!("No games found in {}", name);
            continue;
        }
        tracing::info!("Found {} games in {}", games.len(), name);

        for game in &games {
            warn_on_slug_collision(&mut titles_by_slug, &game.title);
        }

        for locale in &config.locales {
            for game in &games {
                let filename = writer.write_page(game, locale)?;
                tracing::info!("Generated: {}/{}", locale, filename);
                report.pages += 1;
            }
        }
        all_games.extend(games);
    }
    report.games = all_games.len();

    for locale in &config.locales {
        writer.write_index(&all_games, locale)?;
        tracing::info!("Generated: {}/games-list.json", locale);
        report.categories = writer.write_category_pages(&all_games, locale)?;
        tracing::info!("Generated: {}/categories.html ({} categories)", locale, report.categories);
    }

    if let Some(site_url) = &config.site_url {
        let pages: Vec<String> = config
            .locales
            .iter()
            .flat_map(|locale| writer.page_urls(&all_games, locale))
            .collect();
        let path = config.games_directory.join(SITEMAP_FILE_NAME);
        let mut w = BufWriter::new(File::create(&path)?);
        write_sitemap(site_url, pages.iter().map(String::as_str), &mut w)?;
        w.flush()?;
        tracing::info!("Generated: {} ({} URLs)", SITEMAP_FILE_NAME, pages.len());
    }

    tracing::info!(
        "Generation complete! Created {} game pages across {} locales.",
        report.pages,
        config.locales.len()
    );
    Ok(report)
}

// Two distinct titles with the same slug render to the same file; the later
// one wins. Only reported, never resolved.
fn warn_on_slug_collision(titles_by_slug: &mut HashMap<String, String>, title: &str) {
    let slug = slugify(title);
    match titles_by_slug.get(&slug) {
        Some(existing) if existing != title => tracing::warn!(
            "`{}` and `{}` share the slug `{}`; the later page overwrites the earlier one",
            existing,
            title,
            slug
        ),
        Some(_) => {}
        None => {
            titles_by_slug.insert(slug, title.to_owned());
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building the portal. Errors can come from listing the
/// feeds, writing pages and indices, writing the sitemap, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the feeds directory can't be listed.
    Parse(ParseError),

    /// Returned for errors writing pages or index files.
    Write(WriteError),

    /// Returned for errors writing the sitemap.
    Sitemap(SitemapError),

    /// Returned when the output directory can't be created.
    CreateOutput { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Sitemap(err) => err.fmt(f),
            Error::CreateOutput { path, err } => {
                write!(f, "Creating output directory '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::CreateOutput { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<SitemapError> for Error {
    /// Converts [`SitemapError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: SitemapError) -> Error {
        Error::Sitemap(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::INDEX_FILE_NAME;
    use crate::parser::FeedFormat;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use url::Url;

    const EXAMPLE_FEED: &str =
        "<rss><channel><item><id>42</id><title>Block Blast</title><url>http://x/g</url></item></channel></rss>";

    fn project(root: &Path, format: FeedFormat) -> Config {
        fs::create_dir_all(root.join("feeds")).unwrap();
        Config {
            feeds_directory: root.join("feeds"),
            games_directory: root.join("games"),
            format,
            ..Config::default()
        }
    }

    #[test]
    fn test_example_feed_end_to_end() -> Result<()> {
        for &format in &[FeedFormat::Lenient, FeedFormat::Strict] {
            let root = TempDir::new()?;
            let config = project(root.path(), format);
            fs::write(config.feeds_directory.join("games.xml"), EXAMPLE_FEED)?;

            let report = build_site(&config)?;
            assert_eq!(1, report.games);
            assert_eq!(2, report.pages);
            assert!(config.games_directory.join("en/block-blast-en.html").is_file());
            assert!(config.games_directory.join("de/block-blast-de.html").is_file());
            assert_eq!(1, report.categories);
            assert!(config.games_directory.join("en/category/arcade/index.html").is_file());
            assert!(config.games_directory.join("de/categories.html").is_file());

            let index = fs::read_to_string(config.games_directory.join("en").join(INDEX_FILE_NAME))?;
            let entries: serde_json::Value = serde_json::from_str(&index).unwrap();
            assert_eq!(
                serde_json::json!([{
                    "id": "42",
                    "title": "Block Blast",
                    "description": "A fun online game.",
                    "category": "Arcade",
                    "thumb": "",
                    "url": "games/en/block-blast-en.html",
                    "width": "800",
                    "height": "600",
                    "tags": "",
                    "slug": "block-blast"
                }]),
                entries
            );
        }
        Ok(())
    }

    #[test]
    fn test_malformed_feed_is_skipped() -> Result<()> {
        let root = TempDir::new()?;
        let config = project(root.path(), FeedFormat::Strict);
        fs::write(config.feeds_directory.join("a-broken.xml"), "<rss><channel><item>")?;
        fs::write(config.feeds_directory.join("b-good.xml"), EXAMPLE_FEED)?;

        let report = build_site(&config)?;
        assert_eq!(2, report.feeds);
        assert_eq!(1, report.failed_feeds.len());
        assert!(report.failed_feeds[0].0.ends_with("a-broken.xml"));
        assert_eq!(1, report.games);
        Ok(())
    }

    #[test]
    fn test_index_spans_feeds_in_order() -> Result<()> {
        let root = TempDir::new()?;
        let config = project(root.path(), FeedFormat::Lenient);
        fs::write(
            config.feeds_directory.join("2.xml"),
            "<item><title>Zebra Dash</title></item><item><title>Apple Pop</title></item>",
        )?;
        fs::write(config.feeds_directory.join("1.xml"), "<item><title>Mango Jump</title></item>")?;

        build_site(&config)?;
        let index = fs::read_to_string(config.games_directory.join("de").join(INDEX_FILE_NAME))?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&index).unwrap();
        let slugs: Vec<_> = entries.iter().map(|e| e["slug"].as_str().unwrap()).collect();
        assert_eq!(vec!["mango-jump", "zebra-dash", "apple-pop"], slugs);
        Ok(())
    }

    #[test]
    fn test_slug_collision_overwrites() -> Result<()> {
        let root = TempDir::new()?;
        let config = project(root.path(), FeedFormat::Lenient);
        fs::write(
            config.feeds_directory.join("games.xml"),
            "<item><title>Block Blast</title></item><item><title>block-blast!</title></item>",
        )?;

        let report = build_site(&config)?;
        assert_eq!(2, report.games);
        assert_eq!(4, report.pages);
        let html = fs::read_to_string(config.games_directory.join("en/block-blast-en.html"))?;
        assert!(html.contains("<h1 class=\"game-title\">block-blast!</h1>"));
        // one page, the index, the category listings and their index page
        assert_eq!(4, fs::read_dir(config.games_directory.join("en"))?.count());
        Ok(())
    }

    #[test]
    fn test_no_feeds() -> Result<()> {
        let root = TempDir::new()?;
        let config = project(root.path(), FeedFormat::Lenient);
        let report = build_site(&config)?;
        assert_eq!(0, report.feeds);
        assert!(!config.games_directory.join("en").exists());
        Ok(())
    }

    #[test]
    fn test_missing_feeds_directory_is_fatal() -> Result<()> {
        let root = TempDir::new()?;
        let config = Config {
            feeds_directory: root.path().join("missing"),
            games_directory: root.path().join("games"),
            ..Config::default()
        };
        assert!(matches!(build_site(&config), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_sitemap() -> Result<()> {
        let root = TempDir::new()?;
        let config = Config {
            site_url: Some(Url::parse("https://example.com/").unwrap()),
            ..project(root.path(), FeedFormat::Lenient)
        };
        fs::write(config.feeds_directory.join("games.xml"), EXAMPLE_FEED)?;

        build_site(&config)?;
        let sitemap = fs::read_to_string(config.games_directory.join(SITEMAP_FILE_NAME))?;
        assert!(sitemap.contains("<loc>https://example.com/games/en/block-blast-en.html</loc>"));
        assert!(sitemap.contains("<loc>https://example.com/games/de/block-blast-de.html</loc>"));
        Ok(())
    }
}
