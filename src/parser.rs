//! Defines the [`FeedParser`] capability, the [`Parser`] that applies it to
//! the feed files on disk, and the [`Error`] type shared by the parser
//! implementations in [`crate::lenient`] and [`crate::strict`].

use crate::game::GameRecord;
use crate::lenient::LenientParser;
use crate::strict::StrictParser;
use serde::Deserialize;
use std::fmt;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// Some feeds were saved from a browser and begin with the browser's
/// "no style information" notice rather than with markup.
const DIAGNOSTIC_LINE_PREFIX: &str = "This XML file does not appear";

const FEED_EXTENSION: &str = "xml";

/// Converts the text of a single feed file into [`GameRecord`]s. Every
/// returned record has a title; records without one are dropped rather than
/// reported.
pub trait FeedParser {
    fn parse(&self, input: &str) -> Result<Vec<GameRecord>>;
}

/// Selects the [`FeedParser`] implementation.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// Pattern-based extraction of `<item>` blocks. Tolerates markup a real
    /// XML parser would reject. See [`LenientParser`].
    Lenient,

    /// Structural parsing of RSS or the simple `<game>` dialect. See
    /// [`StrictParser`].
    Strict,
}

impl Default for FeedFormat {
    fn default() -> Self {
        FeedFormat::Lenient
    }
}

impl FeedFormat {
    pub fn feed_parser(self) -> Box<dyn FeedParser> {
        match self {
            FeedFormat::Lenient => Box::new(LenientParser),
            FeedFormat::Strict => Box::new(StrictParser),
        }
    }
}

/// Reads feed files from disk and parses them with a [`FeedParser`].
pub struct Parser {
    feed_parser: Box<dyn FeedParser>,
}

impl Parser {
    pub fn new(format: FeedFormat) -> Parser {
        Parser::with_feed_parser(format.feed_parser())
    }

    pub fn with_feed_parser(feed_parser: Box<dyn FeedParser>) -> Parser {
        Parser { feed_parser }
    }

    /// Lists the feed files (extension `.xml`) directly inside `dir`, sorted
    /// by file name so that repeated runs visit feeds in the same order.
    pub fn feed_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for result in read_dir(dir)? {
            let entry = result?;
            let path = entry.path();
            if entry.file_type()?.is_file()
                && path.extension().map_or(false, |ext| ext == FEED_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Reads and parses the feed at `path`.
    pub fn parse_feed(&self, path: &Path) -> Result<Vec<GameRecord>> {
        match self._parse_feed(path) {
            Ok(records) => Ok(records),
            Err(e) => Err(Error::Annotated(
                format!("parsing feed `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_feed(&self, path: &Path) -> Result<Vec<GameRecord>> {
        let contents = std::fs::read_to_string(path)?;
        self.feed_parser.parse(&contents)
    }
}

/// Removes the browser diagnostic line from the start of `input`, if present.
pub fn strip_diagnostic_line(input: &str) -> &str {
    if !input.starts_with(DIAGNOSTIC_LINE_PREFIX) {
        return input;
    }
    match input.find('\n') {
        Some(i) => &input[i + 1..],
        None => "",
    }
}

/// Represents the result of a feed-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or parsing a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when the markup is rejected by the XML reader (mismatched
    /// end tags, undefined entities, invalid encoding, etc).
    Xml(quick_xml::Error),

    /// Returned when the input ends while an element is still open.
    UnclosedElement(String),

    /// Returned when the input contains no element at all.
    MissingRoot,

    /// Returned when a second top-level element follows the root.
    TrailingContent(String),

    /// Returned for I/O errors reading feed files.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Xml(err) => err.fmt(f),
            Error::UnclosedElement(name) => {
                write!(f, "element `<{}>` is never closed", name)
            }
            Error::MissingRoot => write!(f, "no root element found"),
            Error::TrailingContent(name) => {
                write!(f, "unexpected element `<{}>` after the root element", name)
            }
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Xml(err) => Some(err),
            Error::UnclosedElement(_) => None,
            Error::MissingRoot => None,
            Error::TrailingContent(_) => None,
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<quick_xml::Error> for Error {
    /// Converts a [`quick_xml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while reading XML events.
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err)
    }
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Error {
        Error::Xml(err.into())
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
