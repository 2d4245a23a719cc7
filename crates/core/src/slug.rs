// Title to filename normalization

use regex::Regex;
use std::sync::LazyLock;

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Slugify a title for use as a filename (e.g. "Project Ideas" -> "project-ideas").
///
/// Lower-cases and trims the title, drops everything that is not a word
/// character, whitespace or a hyphen, then turns whitespace runs into a single
/// hyphen and collapses repeated hyphens. Applying it twice yields the same
/// result as applying it once.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = DISALLOWED_RE.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE_RE.replace_all(&stripped, "-");
    HYPHENS_RE.replace_all(&hyphenated, "-").into_owned()
}

/// Best-effort display title recovered from a slug ("project-ideas" -> "project ideas").
pub fn title_from_slug(slug: &str) -> String {
    slug.replace('-', " ")
}
