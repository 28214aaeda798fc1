//! Builds the [`Handlebars`] registry used to render game pages.
//!
//! Every insertion point in a page template names its escaping context:
//!
//! * `{{field}}` is HTML-escaped (`& < > " '`), which is safe both in element
//!   text and in quoted attribute values.
//! * `{{{js field}}}` yields the contents of a single-quoted JavaScript string
//!   literal for use inside `<script>` elements.
//! * `{{{json field}}}` yields a complete JSON string literal, for structured
//!   data blocks.

use handlebars::{handlebars_helper, Handlebars, TemplateError};

/// The page template compiled into the binary.
pub const DEFAULT_PAGE_TEMPLATE: &str = include_str!("../theme/game-page.hbs");

/// The registry name of the game page template.
pub const PAGE_TEMPLATE_NAME: &str = "game-page";

/// The registry name of the listing page of a single category.
pub const CATEGORY_TEMPLATE_NAME: &str = "category-page";

/// The registry name of the page listing all categories.
pub const CATEGORIES_INDEX_TEMPLATE_NAME: &str = "categories-index";

const CATEGORY_TEMPLATE: &str = include_str!("../theme/category-page.hbs");
const CATEGORIES_INDEX_TEMPLATE: &str = include_str!("../theme/categories-index.hbs");

handlebars_helper!(js: |s: str| escape_js_string(s));
handlebars_helper!(json: |s: str| escape_json_string(s));

/// Creates a registry with the escaping helpers installed, `source`
/// registered as [`PAGE_TEMPLATE_NAME`] and the built-in category templates.
/// Strict mode is on, so a template that references an unknown field fails
/// to render instead of leaving a hole in the page.
pub fn registry(source: &str) -> Result<Handlebars<'static>, TemplateError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(|s| html_escape::encode_quoted_attribute(s).into_owned());
    registry.register_helper("js", Box::new(js));
    registry.register_helper("json", Box::new(json));
    registry.register_template_string(PAGE_TEMPLATE_NAME, source)?;
    registry.register_template_string(CATEGORY_TEMPLATE_NAME, CATEGORY_TEMPLATE)?;
    registry.register_template_string(CATEGORIES_INDEX_TEMPLATE_NAME, CATEGORIES_INDEX_TEMPLATE)?;
    Ok(registry)
}

fn escape_js_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    // quotes, `</script>` and `<!--`
    html_escape::encode_script_single_quoted_text(&escaped).into_owned()
}

fn escape_json_string(s: &str) -> String {
    // A `<` can't end the surrounding script element once it is escaped.
    serde_json::Value::String(s.to_owned())
        .to_string()
        .replace('<', "\\u003c")
}
