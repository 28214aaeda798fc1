//! Support for writing a `sitemap.xml` that lists every generated page.

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::io::Write;
use url::Url;

pub const SITEMAP_FILE_NAME: &str = "sitemap.xml";

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGE_FREQUENCY: &str = "monthly";
const PRIORITY: &str = "0.7";

/// Writes a sitemap for `pages` (site-relative page paths such as
/// `games/en/block-blast-en.html`) to `w`. Each path is resolved against
/// `site_url`; `lastmod` is today's date in UTC.
pub fn write_sitemap<'a, W: Write>(
    site_url: &Url,
    pages: impl IntoIterator<Item = &'a str>,
    w: W,
) -> Result<()> {
    let lastmod = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let locations = pages
        .into_iter()
        .map(|page| site_url.join(page))
        .collect::<std::result::Result<Vec<Url>, url::ParseError>>()?;

    let mut writer = Writer::new_with_indent(w, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("urlset")
        .with_attribute(("xmlns", SITEMAP_NAMESPACE))
        .write_inner_content(|writer| {
            for location in &locations {
                writer.create_element("url").write_inner_content(|writer| {
                    writer
                        .create_element("loc")
                        .write_text_content(BytesText::new(location.as_str()))?;
                    writer
                        .create_element("lastmod")
                        .write_text_content(BytesText::new(&lastmod))?;
                    writer
                        .create_element("changefreq")
                        .write_text_content(BytesText::new(CHANGE_FREQUENCY))?;
                    writer
                        .create_element("priority")
                        .write_text_content(BytesText::new(PRIORITY))?;
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a sitemap.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page path can't be joined onto the site URL.
    UrlParse(url::ParseError),

    /// Returned for errors writing the output.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator when writing XML.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
