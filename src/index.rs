//! The per-locale JSON listing of every generated game page.

use crate::category::CATEGORY_DIRECTORY;
use crate::game::GameRecord;
use crate::slug::slugify;
use serde::Serialize;

/// The name of the index file written into each locale directory.
pub const INDEX_FILE_NAME: &str = "games-list.json";

/// One entry of a locale's index. Fields serialize in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub thumb: &'a str,

    /// The generated page, e.g. `games/en/block-blast-en.html`, rather than
    /// the game URL from the feed.
    pub url: String,

    pub width: &'a str,
    pub height: &'a str,
    pub tags: &'a str,
    pub slug: String,
}

impl<'a> IndexEntry<'a> {
    pub fn new(record: &'a GameRecord, locale: &str, url_prefix: &str) -> IndexEntry<'a> {
        let slug = slugify(&record.title);
        IndexEntry {
            id: &record.id,
            title: &record.title,
            description: &record.description,
            category: &record.category,
            thumb: &record.thumb,
            url: page_url(url_prefix, &slug, locale),
            width: record.width_or_default(),
            height: record.height_or_default(),
            tags: &record.tags,
            slug,
        }
    }
}

/// The file name of the page for `slug` in `locale`.
pub fn page_file_name(slug: &str, locale: &str) -> String {
    format!("{}-{}.html", slug, locale)
}

/// The site-relative path of the page for `slug` in `locale`.
pub fn page_url(url_prefix: &str, slug: &str, locale: &str) -> String {
    let path = format!("{}/{}", locale, page_file_name(slug, locale));
    match url_prefix.trim_end_matches('/') {
        "" => path,
        prefix => format!("{}/{}", prefix, path),
    }
}

/// The site-relative path of the listing page of the category `slug` in
/// `locale`.
pub fn category_url(url_prefix: &str, slug: &str, locale: &str) -> String {
    let path = format!("{}/{}/{}/index.html", locale, CATEGORY_DIRECTORY, slug);
    match url_prefix.trim_end_matches('/') {
        "" => path,
        prefix => format!("{}/{}", prefix, path),
    }
}

/// Builds the index entries for `records` in `locale`, preserving order.
pub fn entries<'a>(records: &'a [GameRecord], locale: &str, url_prefix: &str) -> Vec<IndexEntry<'a>> {
    records
        .iter()
        .map(|record| IndexEntry::new(record, locale, url_prefix))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_url() {
        assert_eq!("games/en/block-blast-en.html", page_url("games", "block-blast", "en"));
        assert_eq!("games/de/snake-de.html", page_url("games/", "snake", "de"));
        assert_eq!("de/snake-de.html", page_url("", "snake", "de"));
    }

    #[test]
    fn test_category_url() {
        assert_eq!(
            "games/en/category/arcade/index.html",
            category_url("games", "arcade", "en")
        );
        assert_eq!("de/category/board-games/index.html", category_url("", "board-games", "de"));
    }

    #[test]
    fn test_entry_serialization_matches_published_schema() {
        let mut record = GameRecord {
            id: String::from("42"),
            title: String::from("Block Blast"),
            url: String::from("http://x/g"),
            ..GameRecord::default()
        };
        record.apply_defaults();

        let json = serde_json::to_string(&IndexEntry::new(&record, "en", "games")).unwrap();
        assert_eq!(
            r#"{"id":"42","title":"Block Blast","description":"A fun online game.","category":"Arcade","thumb":"","url":"games/en/block-blast-en.html","width":"800","height":"600","tags":"","slug":"block-blast"}"#,
            json
        );
    }

    #[test]
    fn test_entry_falls_back_to_default_size() {
        let record = GameRecord {
            title: String::from("Snake"),
            ..GameRecord::default()
        };
        let entry = IndexEntry::new(&record, "de", "games");
        assert_eq!("800", entry.width);
        assert_eq!("600", entry.height);
        assert_eq!("", entry.description);
    }
}
