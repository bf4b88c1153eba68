use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::Entry;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static DATED_BASENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}/\d{2}/\d{2}/").unwrap());
static DATE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4}) (\d{2}):(\d{2}):(\d{2})").unwrap());

/// Derive the output filename for an entry: sanitized title, prefixed with a
/// date when one can be read off the entry.
pub fn generate_filename(entry: &Entry) -> String {
    let title = UNSAFE_CHARS
        .replace_all(&entry.title, "_")
        .replace(' ', "_");

    match date_prefix(entry) {
        Some(prefix) => format!("{}_{}.md", prefix, title),
        None => format!("{}.md", title),
    }
}

// A `YYYY/MM/DD/slug` basename wins over the DATE field. The DATE digits are
// recaptured verbatim into `YYYY-MM-DD-HHMMSS`; no AM/PM arithmetic.
fn date_prefix(entry: &Entry) -> Option<String> {
    if !entry.basename.is_empty() && DATED_BASENAME.is_match(&entry.basename) {
        return Some(entry.basename.replace('/', "-"));
    }

    let caps = DATE_FIELD.captures(&entry.date)?;
    Some(format!(
        "{}-{}-{}-{}{}{}",
        &caps[3], &caps[1], &caps[2], &caps[4], &caps[5], &caps[6]
    ))
}

/// Re-serialize an entry in its original MovableType framing, for the
/// unmodified passthrough copy. Empty fields are omitted; the title line is
/// always present.
pub fn generate_mt_content(entry: &Entry) -> String {
    let mut mt = String::new();

    if !entry.author.is_empty() {
        let _ = writeln!(mt, "AUTHOR: {}", entry.author);
    }
    let _ = writeln!(mt, "TITLE: {}", entry.title);
    if !entry.basename.is_empty() {
        let _ = writeln!(mt, "BASENAME: {}", entry.basename);
    }
    if !entry.status.is_empty() {
        let _ = writeln!(mt, "STATUS: {}", entry.status);
    }
    if !entry.date.is_empty() {
        let _ = writeln!(mt, "DATE: {}", entry.date);
    }
    if !entry.category.is_empty() {
        let _ = writeln!(mt, "CATEGORY: {}", entry.category);
    }
    if !entry.image_url.is_empty() {
        let _ = writeln!(mt, "IMAGE: {}", entry.image_url);
    }

    mt.push_str("-----\n");
    mt.push_str("BODY:\n");
    mt.push_str(&entry.body);
    mt.push_str("\n-----\n");

    mt
}
