//! Maintenance pass over already-generated pages: swaps in the current
//! navigation bar, replaces the placeholder tag-manager ID, and makes sure
//! every page loads the shared header script. Pages are only rewritten when
//! their content actually changes, so running the pass twice is a no-op.

use regex::{NoExpand, Regex};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

const DEFAULT_REPLACEMENT: &str = r#"<nav class="navbar">
        <div class="nav-container">
            <div class="nav-logo">
                <a href="../../index.html">
                    <h1>SuperGames</h1>
                </a>
            </div>
            <div class="nav-search">
                <input type="text" id="searchInput" placeholder="Search games...">
            </div>
            <div class="nav-actions">
                <a href="../../index.html" class="btn btn-secondary">Back to Home</a>
            </div>
        </div>
    </nav>"#;

const HTML_EXTENSION: &str = "html";

static NAVBAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<nav class="navbar">.*?</nav>"#).expect("valid navbar regex")
});

/// What the patch pass writes into each page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarConfig {
    /// Replaces the first `<nav class="navbar">...</nav>` block. It should
    /// itself be such a block, or a second pass would not be a no-op.
    pub replacement: String,

    /// Every occurrence of this token is replaced with `tracking_id`.
    pub tracking_placeholder: String,

    pub tracking_id: String,

    /// The `src` of the script tag inserted before `</body>` when the page
    /// doesn't reference it yet.
    pub script_src: String,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        NavbarConfig {
            replacement: DEFAULT_REPLACEMENT.to_owned(),
            tracking_placeholder: String::from("GTM-XXXXXXX"),
            tracking_id: String::from("GTM-PK768FJP"),
            script_src: String::from("../../src/js/utils/header.js"),
        }
    }
}

/// Applies a [`NavbarConfig`] to HTML pages.
pub struct Patcher<'a> {
    config: &'a NavbarConfig,
}

impl<'a> Patcher<'a> {
    pub fn new(config: &'a NavbarConfig) -> Patcher<'a> {
        Patcher { config }
    }

    /// Returns the patched version of `html`. Pure; see the module docs for
    /// the edits applied.
    pub fn patch_html(&self, html: &str) -> String {
        let mut content = NAVBAR
            .replacen(html, 1, NoExpand(&self.config.replacement))
            .into_owned();

        if !self.config.tracking_placeholder.is_empty() {
            content = content.replace(
                &self.config.tracking_placeholder,
                &self.config.tracking_id,
            );
        }

        if !content.contains(&self.config.script_src) {
            let script_tag = format!(
                "\n    <script src=\"{}\"></script>\n</body>",
                self.config.script_src
            );
            content = content.replacen("</body>", &script_tag, 1);
        }

        content
    }

    /// Patches the page at `path` in place. Returns whether the file was
    /// rewritten; unchanged files are left untouched.
    pub fn patch_file(&self, path: &Path) -> Result<bool> {
        let original = std::fs::read_to_string(path)?;
        let patched = self.patch_html(&original);
        if patched == original {
            return Ok(false);
        }
        std::fs::write(path, patched)?;
        Ok(true)
    }

    /// Patches every `.html` file below `dir`. Failures on individual files
    /// are logged and collected in the [`Summary`]; only an unusable `dir`
    /// aborts the pass.
    pub fn patch_tree(&self, dir: &Path) -> Result<Summary> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_owned()));
        }

        let mut summary = Summary::default();
        for result in WalkDir::new(dir).sort_by_file_name() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_owned();
                    tracing::error!("Error with {}: {}", path.display(), e);
                    summary.errors.push((path, Error::WalkDir(e)));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != HTML_EXTENSION)
            {
                continue;
            }

            summary.total += 1;
            match self.patch_file(path) {
                Ok(true) => {
                    tracing::info!("Updated: {}", path.display());
                    summary.updated.push(path.to_owned());
                }
                Ok(false) => {
                    tracing::info!("No changes needed: {}", path.display());
                    summary.unchanged += 1;
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", path.display(), e);
                    summary.errors.push((path.to_owned(), e));
                }
            }
        }
        Ok(summary)
    }
}

/// The outcome of [`Patcher::patch_tree`].
#[derive(Debug, Default)]
pub struct Summary {
    /// The number of HTML files found.
    pub total: usize,

    /// Files that were rewritten, in visiting order.
    pub updated: Vec<PathBuf>,

    pub unchanged: usize,

    pub errors: Vec<(PathBuf, Error)>,
}

impl fmt::Display for Summary {
    /// Renders the end-of-run report: counts, then the first ten updated
    /// files, then every error.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "Total files found: {}", self.total)?;
        writeln!(f, "Files updated: {}", self.updated.len())?;
        writeln!(f, "Files unchanged: {}", self.unchanged)?;
        writeln!(f, "Files with errors: {}", self.errors.len())?;

        if !self.updated.is_empty() {
            writeln!(f, "\nFirst 10 updated files:")?;
            for (i, path) in self.updated.iter().take(10).enumerate() {
                writeln!(f, "{}. {}", i + 1, path.display())?;
            }
        }

        if !self.errors.is_empty() {
            writeln!(f, "\nFiles with errors:")?;
            for (path, err) in &self.errors {
                writeln!(f, "- {}: {}", path.display(), err)?;
            }
        }
        Ok(())
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem patching pages.
#[derive(Debug)]
pub enum Error {
    /// Returned when the directory to patch doesn't exist or isn't a
    /// directory.
    NotADirectory(PathBuf),

    /// Returned when walking the directory tree fails.
    WalkDir(walkdir::Error),

    /// Returned for I/O errors reading or writing a page. This includes pages
    /// that aren't valid UTF-8.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotADirectory(path) => {
                write!(f, "`{}` is not a directory", path.display())
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotADirectory(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html>
<head><script>var id = 'GTM-XXXXXXX';</script></head>
<body>
    <nav class="navbar">
        <div class="nav-logo"><h1>CrazyGames</h1></div>
    </nav>
    <main><nav class="navbar">second</nav></main>
    <noscript>GTM-XXXXXXX</noscript>
</body>
</html>"#;

    #[test]
    fn test_patch_html() {
        let config = NavbarConfig::default();
        let patched = Patcher::new(&config).patch_html(PAGE);

        assert!(patched.contains("<h1>SuperGames</h1>"));
        assert!(patched.contains(r#"id="searchInput""#));
        assert!(!patched.contains("CrazyGames"));
        // only the first navbar is replaced
        assert!(patched.contains(r#"<nav class="navbar">second</nav>"#));
        assert!(!patched.contains("GTM-XXXXXXX"));
        assert_eq!(2, patched.matches("GTM-PK768FJP").count());
        assert!(patched.contains(
            "\n    <script src=\"../../src/js/utils/header.js\"></script>\n</body>"
        ));
    }

    #[test]
    fn test_patch_html_is_idempotent() {
        let config = NavbarConfig::default();
        let patcher = Patcher::new(&config);
        let once = patcher.patch_html(PAGE);
        assert_eq!(once, patcher.patch_html(&once));
    }

    #[test]
    fn test_replacement_is_literal() {
        let config = NavbarConfig {
            replacement: String::from(r#"<nav class="navbar">$0 costs $1</nav>"#),
            ..NavbarConfig::default()
        };
        let patched = Patcher::new(&config).patch_html(PAGE);
        assert!(patched.contains("$0 costs $1"));
    }

    #[test]
    fn test_existing_script_not_duplicated() {
        let config = NavbarConfig::default();
        let page = r#"<body><script src="../../src/js/utils/header.js"></script></body>"#;
        assert_eq!(page, Patcher::new(&config).patch_html(page));
    }

    #[test]
    fn test_patch_tree_second_run_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let locale_dir = dir.path().join("en");
        fs::create_dir(&locale_dir)?;
        let page = locale_dir.join("block-blast-en.html");
        fs::write(&page, PAGE)?;
        fs::write(locale_dir.join("games-list.json"), "[]")?;

        let config = NavbarConfig::default();
        let patcher = Patcher::new(&config);

        let first = patcher.patch_tree(dir.path())?;
        assert_eq!(1, first.total);
        assert_eq!(vec![page.clone()], first.updated);

        let modified = fs::metadata(&page)?.modified()?;
        let contents = fs::read_to_string(&page)?;

        let second = patcher.patch_tree(dir.path())?;
        assert_eq!(1, second.total);
        assert!(second.updated.is_empty());
        assert_eq!(1, second.unchanged);
        assert_eq!(modified, fs::metadata(&page)?.modified()?);
        assert_eq!(contents, fs::read_to_string(&page)?);
        Ok(())
    }

    #[test]
    fn test_patch_tree_collects_errors() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("binary.html"), b"\xff\xfe\x00")?;
        fs::write(dir.path().join("ok.html"), PAGE)?;

        let config = NavbarConfig::default();
        let summary = Patcher::new(&config).patch_tree(dir.path())?;
        assert_eq!(2, summary.total);
        assert_eq!(1, summary.updated.len());
        assert_eq!(1, summary.errors.len());
        assert!(summary.to_string().contains("Files with errors: 1"));
        Ok(())
    }

    #[test]
    fn test_patch_tree_missing_directory() {
        let config = NavbarConfig::default();
        assert!(Patcher::new(&config)
            .patch_tree(Path::new("/nonexistent/games"))
            .is_err());
    }
}
