//! Defines the [`GameRecord`] type, the in-memory representation of a single
//! game extracted from a feed, along with the defaults applied to the fields
//! a feed leaves out.

use std::collections::BTreeMap;

/// The description used when a feed item doesn't provide one.
pub const DEFAULT_DESCRIPTION: &str = "A fun online game.";

/// The category used when a feed item doesn't provide one.
pub const DEFAULT_CATEGORY: &str = "Arcade";

/// The embed width used when a feed item doesn't provide one.
pub const DEFAULT_WIDTH: &str = "800";

/// The embed height used when a feed item doesn't provide one.
pub const DEFAULT_HEIGHT: &str = "600";

/// Some feeds fill in a placeholder title rather than omitting it. Records
/// carrying it are treated as untitled.
pub const PLACEHOLDER_TITLE: &str = "Untitled Game";

/// A single game. Records are rebuilt from the feeds on every run and are
/// never persisted; only the pages and index files rendered from them are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameRecord {
    /// Opaque identifier from the feed, possibly empty.
    pub id: String,

    /// Display name. Always non-empty on records returned by a parser.
    pub title: String,

    pub description: String,
    pub category: String,

    /// The embeddable game URL. Not validated.
    pub url: String,

    /// The thumbnail image URL. Not validated.
    pub thumb: String,

    pub width: String,
    pub height: String,

    /// Free-form tag text, passed through as-is.
    pub tags: String,

    /// Parsed but not rendered anywhere.
    pub instructions: String,

    /// Child elements of a simple-dialect `<game>` that don't correspond to
    /// any of the fields above, keyed by tag name.
    pub extra: BTreeMap<String, String>,
}

impl GameRecord {
    /// Assigns `value` to the field named by `tag`. Returns `false` if `tag`
    /// isn't one of the known record fields.
    pub fn set_field(&mut self, tag: &str, value: String) -> bool {
        let field = match tag {
            "id" => &mut self.id,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "url" => &mut self.url,
            "thumb" => &mut self.thumb,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "tags" => &mut self.tags,
            "instructions" => &mut self.instructions,
            _ => return false,
        };
        *field = value;
        true
    }

    /// Fills in empty `description`, `category`, `width` and `height` fields
    /// with their defaults.
    pub fn apply_defaults(&mut self) {
        fn default(field: &mut String, value: &str) {
            if field.trim().is_empty() {
                *field = value.to_owned();
            }
        }

        default(&mut self.description, DEFAULT_DESCRIPTION);
        default(&mut self.category, DEFAULT_CATEGORY);
        default(&mut self.width, DEFAULT_WIDTH);
        default(&mut self.height, DEFAULT_HEIGHT);
    }

    /// Whether the record carries a usable title.
    pub fn has_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty() && title != PLACEHOLDER_TITLE
    }

    /// The embed width, falling back to [`DEFAULT_WIDTH`] for records that
    /// skipped the defaulting pass.
    pub fn width_or_default(&self) -> &str {
        non_empty_or(&self.width, DEFAULT_WIDTH)
    }

    /// The embed height, falling back to [`DEFAULT_HEIGHT`] for records that
    /// skipped the defaulting pass.
    pub fn height_or_default(&self) -> &str {
        non_empty_or(&self.height, DEFAULT_HEIGHT)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.is_empty() {
        true => default,
        false => value,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply_defaults_fills_missing_fields() {
        let mut record = GameRecord {
            title: String::from("Block Blast"),
            width: String::from("  "),
            category: String::from("Puzzle"),
            ..GameRecord::default()
        };
        record.apply_defaults();

        assert_eq!(DEFAULT_DESCRIPTION, record.description);
        assert_eq!("Puzzle", record.category);
        assert_eq!(DEFAULT_WIDTH, record.width);
        assert_eq!(DEFAULT_HEIGHT, record.height);
    }

    #[test]
    fn test_has_title_rejects_placeholder() {
        let mut record = GameRecord::default();
        assert!(!record.has_title());

        record.title = PLACEHOLDER_TITLE.to_owned();
        assert!(!record.has_title());

        record.title = String::from("Snake");
        assert!(record.has_title());
    }

    #[test]
    fn test_set_field_unknown_tag() {
        let mut record = GameRecord::default();
        assert!(record.set_field("thumb", String::from("t.png")));
        assert!(!record.set_field("publisher", String::from("Acme")));
        assert_eq!("t.png", record.thumb);
    }
}
