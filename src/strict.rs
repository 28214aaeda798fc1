//! A [`FeedParser`] that reads the feed as XML. Two document shapes are
//! understood:
//!
//! * RSS, where games are the `channel/item` elements under an `rss` root:
//!
//!   ```xml
//!   <rss><channel>
//!     <item><title>Block Blast</title><url>https://example.com/g</url></item>
//!   </channel></rss>
//!   ```
//!
//! * A simple dialect, where games are `game` children of any other root and
//!   every child element of a game is a field:
//!
//!   ```xml
//!   <games>
//!     <game><title>Block Blast</title><width>640</width></game>
//!   </games>
//!   ```

use crate::game::GameRecord;
use crate::parser::{strip_diagnostic_line, Error, FeedParser, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

/// Character references that feeds commonly carry but XML doesn't define (or
/// that are double-escaped), replaced before the first parse attempt.
const REFERENCE_REPLACEMENTS: &[(&str, &str)] = &[
    ("&rsquo;", "'"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
];

static CHARACTER_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^;\s]+;").expect("valid character reference regex"));

/// Parses feeds as well-formed XML. If the first attempt fails, every
/// remaining character reference is removed and the parse is retried once.
pub struct StrictParser;

impl FeedParser for StrictParser {
    fn parse(&self, input: &str) -> Result<Vec<GameRecord>> {
        let input = strip_diagnostic_line(input);
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut content = input.to_owned();
        for (reference, replacement) in REFERENCE_REPLACEMENTS {
            content = content.replace(reference, replacement);
        }

        let root = match parse_document(&content) {
            Ok(root) => root,
            Err(e) => {
                tracing::debug!("Retrying without character references: {}", e);
                parse_document(&CHARACTER_REFERENCE.replace_all(&content, ""))?
            }
        };

        Ok(match root.name.as_str() {
            "rss" => rss_records(&root),
            _ => simple_records(&root),
        })
    }
}

fn rss_records(root: &Element) -> Vec<GameRecord> {
    let channel = match root.children_named("channel").next() {
        Some(channel) => channel,
        None => return Vec::new(),
    };

    channel
        .children_named("item")
        .filter_map(|item| {
            let mut record = GameRecord::default();
            for child in &item.children {
                let text = html_escape::decode_html_entities(child.text.trim()).into_owned();
                record.set_field(&child.name, text);
            }
            if !record.has_title() {
                tracing::debug!("Skipping RSS item without a title");
                return None;
            }
            record.apply_defaults();
            Some(record)
        })
        .collect()
}

fn simple_records(root: &Element) -> Vec<GameRecord> {
    root.children_named("game")
        .filter_map(|game| {
            let mut record = GameRecord::default();
            for child in &game.children {
                let text = child.text.trim().to_owned();
                if !record.set_field(&child.name, text.clone()) {
                    record.extra.insert(child.name.clone(), text);
                }
            }
            // verbatim: the placeholder title is only an RSS convention
            if record.title.is_empty() {
                tracing::debug!("Skipping game element without a title");
                return None;
            }
            Some(record)
        })
        .collect()
}

/// A minimal element tree. `text` holds the character data that precedes the
/// element's first child.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Element {
        Element {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Element::default()
        }
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn push_text(&mut self, text: &str) {
        if self.children.is_empty() {
            self.text.push_str(text);
        }
    }
}

fn parse_document(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::new(start.name().as_ref())),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::new(start.name().as_ref()))?,
            Event::End(end) => match stack.pop() {
                Some(element) => attach(&mut stack, &mut root, element)?,
                None => {
                    return Err(Error::TrailingContent(
                        String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    ))
                }
            },
            Event::Text(text) => {
                if let Some(element) = stack.last_mut() {
                    element.push_text(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(element) = stack.last_mut() {
                    element.push_text(&cdata.decode()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(Error::UnclosedElement(open.name));
    }
    root.ok_or(Error::MissingRoot)
}

// Adds a completed element to its parent, or makes it the document root.
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::TrailingContent(element.name)),
    }
    Ok(())
}
