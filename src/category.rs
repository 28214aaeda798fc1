//! Groups game records into categories for the per-locale category listing
//! pages written by [`crate::write::Writer::write_category_pages`].

use crate::game::{GameRecord, DEFAULT_CATEGORY};
use crate::slug::slugify;

/// The directory, inside a locale directory, holding one
/// `{slug}/index.html` listing per category.
pub const CATEGORY_DIRECTORY: &str = "category";

/// The name of the page listing every category of a locale.
pub const CATEGORIES_INDEX_FILE_NAME: &str = "categories.html";

/// The games sharing a category slug.
#[derive(Debug)]
pub struct Category<'a> {
    /// Display name: the first-seen spelling, lowercased and then
    /// capitalized (`tower DEFENSE` becomes `Tower defense`).
    pub name: String,
    pub slug: String,
    pub games: Vec<&'a GameRecord>,
}

impl Category<'_> {
    /// The `meta` description of the category's listing page.
    pub fn description(&self) -> String {
        let count = self.games.len();
        match self.name.as_str() {
            "Action" => format!("Play {}+ free action games online. Fast-paced gameplay, intense challenges, and thrilling adventures await. No download required.", count),
            "Puzzle" => format!("Solve {}+ free puzzle games online. Train your brain with challenging puzzles, logic games, and mind-bending challenges. Play now.", count),
            "Racing" => format!("Race in {}+ free racing games online. High-speed action, amazing tracks, and competitive gameplay. Start your engines now.", count),
            "Sports" => format!("Play {}+ free sports games online. Football, basketball, soccer and more. Compete, win championships, and dominate the field.", count),
            "Adventure" => format!("Explore {}+ free adventure games online. Epic quests, mysterious worlds, and exciting journeys await. Start your adventure now.", count),
            "Arcade" => format!("Play {}+ classic arcade games online. Retro gameplay, high scores, and endless fun. No quarters needed.", count),
            "Strategy" => format!("Master {}+ free strategy games online. Plan, build, conquer. Test your tactical skills in these challenging games.", count),
            "Girls" => format!("Play {}+ free girls games online. Fashion, dress-up, cooking and creative games. Fun and engaging gameplay for everyone.", count),
            "Kids" => format!("Enjoy {}+ free kids games online. Safe, educational, and fun games for children. No download required.", count),
            "Shooting" => format!("Battle in {}+ free shooting games online. FPS action, intense battles, and competitive gameplay. Lock and load now.", count),
            _ => format!(
                "Play {}+ free {} games online. Fun, engaging gameplay in your browser. No download or registration required.",
                count,
                self.name.to_lowercase()
            ),
        }
    }

    /// The `meta` keywords of the category's listing page.
    pub fn keywords(&self) -> String {
        let name = self.name.to_lowercase();
        format!(
            "{0} games, free {0} games, {0} games online, play {0} games, browser {0} games, free online games",
            name
        )
    }
}

/// Groups `records` by the slug of their category, in order of first
/// appearance. Games keep their order within a category. An empty category
/// counts as [`DEFAULT_CATEGORY`]; categories that slugify to nothing are
/// skipped.
pub fn group(records: &[GameRecord]) -> Vec<Category<'_>> {
    let mut categories: Vec<Category> = Vec::new();
    for record in records {
        let name = match record.category.trim() {
            "" => DEFAULT_CATEGORY,
            name => name,
        };
        let slug = slugify(name);
        if slug.is_empty() {
            tracing::debug!("Not listing `{}` under category `{}`", record.title, name);
            continue;
        }
        match categories.iter_mut().find(|category| category.slug == slug) {
            Some(category) => category.games.push(record),
            None => categories.push(Category {
                name: capitalize(&name.to_lowercase()),
                slug,
                games: vec![record],
            }),
        }
    }
    categories
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
