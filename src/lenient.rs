//! A [`FeedParser`] that never builds a document tree. It finds each
//! `<item>` block by pattern, then each field inside it, so malformed feeds
//! still yield whatever games can be recognized.

use crate::game::GameRecord;
use crate::parser::{strip_diagnostic_line, FeedParser, Result};
use regex::Regex;
use std::sync::LazyLock;

const FIELDS: &[&str] = &[
    "id",
    "title",
    "description",
    "category",
    "url",
    "thumb",
    "width",
    "height",
    "tags",
    "instructions",
];

static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<item>(.*?)</item>").expect("valid item regex"));

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid markup tag regex"));

static FIELD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .map(|&field| {
            let pattern = format!(r"(?is)<{0}>(.*?)</{0}>", field);
            (field, Regex::new(&pattern).expect("valid field regex"))
        })
        .collect()
});

/// Extracts games from `<item>` blocks by tag search. Field contents are
/// entity-decoded and then stripped of any markup tags, so formatting nested
/// inside e.g. a description doesn't survive.
pub struct LenientParser;

impl FeedParser for LenientParser {
    fn parse(&self, input: &str) -> Result<Vec<GameRecord>> {
        let input = strip_diagnostic_line(input);
        Ok(ITEM
            .captures_iter(input)
            .filter_map(|captures| parse_item(&captures[1]))
            .collect())
    }
}

fn parse_item(item: &str) -> Option<GameRecord> {
    let mut record = GameRecord::default();
    for (field, pattern) in FIELD_PATTERNS.iter() {
        if let Some(content) = extract(pattern, item) {
            record.set_field(field, content);
        }
    }

    if record.title.is_empty() {
        tracing::debug!("Skipping feed item without a title");
        return None;
    }
    record.apply_defaults();
    Some(record)
}

// Returns the cleaned content of the first match of `pattern` in `item`.
fn extract(pattern: &Regex, item: &str) -> Option<String> {
    let captures = pattern.captures(item)?;
    let decoded = html_escape::decode_html_entities(&captures[1]);
    Some(MARKUP_TAG.replace_all(&decoded, "").trim().to_owned())
}
