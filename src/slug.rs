//! Derives the URL slug for a game from its title.

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Lowercases `title`, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, and trims leading and trailing hyphens.
///
/// Distinct titles can map to the same slug (e.g., `Block Blast!` and
/// `block-blast`); the pages rendered for them share a file name.
pub fn slugify(title: &str) -> String {
    NON_SLUG_RUN
        .replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_owned()
}
