use crate::category::{self, Category, CATEGORIES_INDEX_FILE_NAME, CATEGORY_DIRECTORY};
use crate::config::Config;
use crate::game::GameRecord;
use crate::index::{self, IndexEntry, INDEX_FILE_NAME};
use crate::slug::slugify;
use crate::template::{
    self, CATEGORIES_INDEX_TEMPLATE_NAME, CATEGORY_TEMPLATE_NAME, DEFAULT_PAGE_TEMPLATE,
    PAGE_TEMPLATE_NAME,
};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Responsible for templating and writing game pages and index files to
/// disk.
pub struct Writer<'a> {
    /// Holds the page template along with the escaping helpers.
    templates: Handlebars<'static>,

    /// The root output directory. Pages and index files for a locale are
    /// written to `{games_directory}/{locale}/`.
    games_directory: &'a Path,

    /// The prefix for page URLs in the index files. See
    /// [`Config::url_prefix`].
    url_prefix: &'a str,

    /// Made available to the page template as `tracking_id`.
    tracking_id: &'a str,
}

/// The values made available to the page template.
#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    thumb: &'a str,
    game_url: &'a str,
    width: &'a str,
    height: &'a str,
    tags: &'a str,
    slug: &'a str,
    locale: &'a str,
    filename: &'a str,
    tracking_id: &'a str,
    extra: &'a BTreeMap<String, String>,
}

/// Shown on category listings for games without a thumbnail. The title is
/// appended, URL-encoded.
const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/200x150/667eea/ffffff?text=";

#[derive(Serialize)]
struct CategoryPageData<'a> {
    locale: &'a str,
    name: &'a str,
    title: String,
    description: String,
    keywords: String,
    url: String,
    count: usize,
    games: Vec<CategoryGame<'a>>,
}

#[derive(Serialize)]
struct CategoryGame<'a> {
    title: &'a str,
    image: String,
    href: String,
}

#[derive(Serialize)]
struct CategoriesIndexData<'a> {
    locale: &'a str,
    category_count: usize,
    game_count: usize,
    categories: Vec<CategoryLink<'a>>,
}

#[derive(Serialize)]
struct CategoryLink<'a> {
    name: &'a str,
    href: String,
    count: usize,
}

impl<'a> Writer<'a> {
    /// Creates a writer from `config`, loading the page template from
    /// [`Config::template`] if it is set.
    pub fn new(config: &'a Config) -> Result<Writer<'a>> {
        let templates = match &config.template {
            Some(path) => template::registry(&read_template(path)?)?,
            None => template::registry(DEFAULT_PAGE_TEMPLATE)?,
        };
        Ok(Writer {
            templates,
            games_directory: &config.games_directory,
            url_prefix: &config.url_prefix,
            tracking_id: &config.tracking_id,
        })
    }

    /// Renders the page for `record` in `locale` and writes it to
    /// `{games_directory}/{locale}/{slug}-{locale}.html`, replacing any
    /// existing file. Returns the file name.
    pub fn write_page(&self, record: &GameRecord, locale: &str) -> Result<String> {
        let slug = slugify(&record.title);
        let filename = index::page_file_name(&slug, locale);
        let html = self.templates.render(
            PAGE_TEMPLATE_NAME,
            &PageData {
                title: &record.title,
                description: &record.description,
                category: &record.category,
                thumb: &record.thumb,
                game_url: &record.url,
                width: record.width_or_default(),
                height: record.height_or_default(),
                tags: &record.tags,
                slug: &slug,
                locale,
                filename: &filename,
                tracking_id: self.tracking_id,
                extra: &record.extra,
            },
        )?;

        let dir = self.locale_directory(locale)?;
        write_file(&dir.join(&filename), html)?;
        Ok(filename)
    }

    /// Writes the index of all `records` for `locale` to
    /// `{games_directory}/{locale}/games-list.json`, replacing any existing
    /// file. Entries keep the order of `records`.
    pub fn write_index(&self, records: &[GameRecord], locale: &str) -> Result<PathBuf> {
        let entries: Vec<IndexEntry> = index::entries(records, locale, self.url_prefix);
        let path = self.locale_directory(locale)?.join(INDEX_FILE_NAME);
        let file = File::create(&path).map_err(|err| Error::WriteFile {
            path: path.clone(),
            err,
        })?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, &entries)?;
        w.flush()?;
        Ok(path)
    }

    /// Writes a listing page for every category of `records` to
    /// `{games_directory}/{locale}/category/{slug}/index.html`, and a page
    /// linking to all of them, largest category first, to
    /// `{games_directory}/{locale}/categories.html`. Returns the number of
    /// categories.
    pub fn write_category_pages(&self, records: &[GameRecord], locale: &str) -> Result<usize> {
        let categories = category::group(records);
        let dir = self.locale_directory(locale)?;

        for category in &categories {
            let html = self
                .templates
                .render(CATEGORY_TEMPLATE_NAME, &self.category_page_data(category, locale))?;
            let category_dir = dir.join(CATEGORY_DIRECTORY).join(&category.slug);
            std::fs::create_dir_all(&category_dir).map_err(|err| Error::CreateDirectory {
                path: category_dir.clone(),
                err,
            })?;
            write_file(&category_dir.join("index.html"), html)?;
        }

        let mut ranked: Vec<&Category> = categories.iter().collect();
        ranked.sort_by(|a, b| b.games.len().cmp(&a.games.len()));
        let html = self.templates.render(
            CATEGORIES_INDEX_TEMPLATE_NAME,
            &CategoriesIndexData {
                locale,
                category_count: categories.len(),
                game_count: records.len(),
                categories: ranked
                    .into_iter()
                    .map(|category| CategoryLink {
                        name: &category.name,
                        href: format!("{}/{}/index.html", CATEGORY_DIRECTORY, category.slug),
                        count: category.games.len(),
                    })
                    .collect(),
            },
        )?;
        write_file(&dir.join(CATEGORIES_INDEX_FILE_NAME), html)?;
        Ok(categories.len())
    }

    fn category_page_data<'c>(&self, category: &'c Category, locale: &'c str) -> CategoryPageData<'c> {
        CategoryPageData {
            locale,
            name: &category.name,
            title: format!("{} Games", category.name),
            description: category.description(),
            keywords: category.keywords(),
            url: index::category_url(self.url_prefix, &category.slug, locale),
            count: category.games.len(),
            games: category
                .games
                .iter()
                .map(|game| CategoryGame {
                    title: &game.title,
                    image: match game.thumb.as_str() {
                        "" => format!(
                            "{}{}",
                            PLACEHOLDER_IMAGE_URL,
                            url::form_urlencoded::byte_serialize(game.title.as_bytes())
                                .collect::<String>()
                        ),
                        thumb => thumb.to_owned(),
                    },
                    // from `{locale}/category/{slug}/` back to `{locale}/`
                    href: format!(
                        "../../{}",
                        index::page_file_name(&slugify(&game.title), locale)
                    ),
                })
                .collect(),
        }
    }

    /// The site-relative URLs of every page written for `records` in
    /// `locale`, in index order.
    pub fn page_urls(&self, records: &[GameRecord], locale: &str) -> Vec<String> {
        records
            .iter()
            .map(|record| index::page_url(self.url_prefix, &slugify(&record.title), locale))
            .collect()
    }

    fn locale_directory(&self, locale: &str) -> Result<PathBuf> {
        let dir = self.games_directory.join(locale);
        std::fs::create_dir_all(&dir).map_err(|err| Error::CreateDirectory {
            path: dir.clone(),
            err,
        })?;
        Ok(dir)
    }
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading the page template file.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned when the page template doesn't compile.
    Template(TemplateError),

    /// Returned when rendering the page template fails.
    Render(RenderError),

    /// Returned when an index file can't be serialized.
    Json(serde_json::Error),

    /// Returned when a locale directory can't be created.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// Returned when an output file can't be written.
    WriteFile { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<TemplateError> for Error {
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<RenderError> for Error {
    /// Converts a [`RenderError`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible template operations.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Template(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::WriteFile { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::Template(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::WriteFile { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
