use std::fmt::Write as _;

use crate::entry::Entry;

mod rules;

/// Render one entry as Hatena-flavored Markdown: front matter, converted
/// body, optional trailing image. Pure and infallible; markup the pipeline
/// does not recognize passes through unchanged.
pub fn to_markdown(entry: &Entry) -> String {
    let mut md = String::new();

    md.push_str("---\n");
    let _ = writeln!(md, "Title: {}", entry.title);
    if !entry.category.is_empty() {
        md.push_str("Category:\n");
        for category in entry.categories() {
            let _ = writeln!(md, "- {}", category);
        }
    }
    if !entry.date.is_empty() {
        let _ = writeln!(md, "Date: {}", entry.date);
    }
    md.push_str("---\n\n");

    md.push_str(&convert_body(&entry.body));

    if !entry.image_url.is_empty() {
        let _ = write!(md, "\n\n![{}]({})", entry.title, entry.image_url);
    }

    md
}

/// Fold the body through the ordered rewrite rules. Rule N+1 always sees the
/// output of rule N.
fn convert_body(body: &str) -> String {
    rules::RULES
        .iter()
        .fold(body.to_string(), |text, rule| rule.apply(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_and_body() {
        let entry = Entry {
            author: "a".to_string(),
            title: "T".to_string(),
            date: "01/15/2023 12:00:00 AM".to_string(),
            category: "X, Y".to_string(),
            body: "line1\n<strong>bold</strong>".to_string(),
            ..Default::default()
        };

        assert_eq!(
            to_markdown(&entry),
            "---\n\
             Title: T\n\
             Category:\n\
             - X\n\
             - Y\n\
             Date: 01/15/2023 12:00:00 AM\n\
             ---\n\n\
             line1\n\
             **bold**"
        );
    }

    #[test]
    fn category_and_date_lines_are_optional() {
        let entry = Entry {
            title: "No Frills".to_string(),
            body: "plain".to_string(),
            ..Default::default()
        };
        let md = to_markdown(&entry);
        assert!(!md.contains("Category:"));
        assert!(!md.contains("Date:"));
        assert!(md.starts_with("---\nTitle: No Frills\n---\n\n"));
    }

    #[test]
    fn whitespace_only_category_items_are_dropped() {
        let entry = Entry {
            title: "T".to_string(),
            category: " , ".to_string(),
            ..Default::default()
        };
        let md = to_markdown(&entry);
        // non-empty raw category still emits the header, just no bullets
        assert!(md.contains("Category:\n---"));
        assert!(!md.contains("- "));
    }

    #[test]
    fn image_url_appends_trailing_image() {
        let entry = Entry {
            title: "Test Blog Post".to_string(),
            body: "body".to_string(),
            image_url: "https://example.com/test.jpg".to_string(),
            ..Default::default()
        };
        assert!(to_markdown(&entry)
            .ends_with("body\n\n![Test Blog Post](https://example.com/test.jpg)"));
    }

    #[test]
    fn no_image_markup_without_image_url() {
        let entry = Entry {
            title: "No Image Post".to_string(),
            body: "Simple post without image".to_string(),
            ..Default::default()
        };
        assert!(!to_markdown(&entry).contains("!["));
    }

    #[test]
    fn body_passes_through_plain_text() {
        assert_eq!(convert_body("普通のテキストです。"), "普通のテキストです。");
    }

    #[test]
    fn body_normalizes_newlines() {
        assert_eq!(convert_body("テスト\r\nテスト\rテスト"), "テスト\nテスト\nテスト");
    }

    #[test]
    fn body_collapses_blank_runs() {
        assert_eq!(convert_body("テスト\n\n\n\nテスト"), "テスト\n\nテスト");
    }

    #[test]
    fn asin_card_beats_generic_link_rule() {
        let body = concat!(
            "<p><div class=\"hatena-asin-detail\">",
            "<a href=\"https://www.amazon.co.jp/dp/B0B88B2L48?tag=x-22\">",
            "<img src=\"https://images.example/B0B88B2L48.jpg\" alt=\"cover\">",
            "</a><div class=\"hatena-asin-detail-info\">",
            "<p class=\"hatena-asin-detail-title\">Some Product</p>",
            "</div></div></p>"
        );
        assert_eq!(convert_body(body), "[asin:B0B88B2L48:detail]");
    }

    #[test]
    fn unrelated_div_falls_through_to_link_rule() {
        let body = concat!(
            "<div class=\"shelf\">",
            "<a href=\"https://www.amazon.co.jp/dp/B0B88B2L48\">Some Product</a>",
            "</div>"
        );
        assert_eq!(
            convert_body(body),
            "<div class=\"shelf\">[Some Product](https://www.amazon.co.jp/dp/B0B88B2L48)</div>"
        );
    }

    #[test]
    fn mixed_markup_document() {
        let body = "<p><strong>重要:</strong> <a href=\"#\">リンク</a>です。</p>";
        assert_eq!(convert_body(body), "**重要:** [リンク](#)です。");
    }

    #[test]
    fn extracted_entry_renders_end_to_end() {
        let export = "AUTHOR: a\nTITLE: T\nDATE: 01/15/2023 12:00:00 AM\nCATEGORY: X, Y\n\
                      -----\nBODY:\nline1\n<strong>bold</strong>\n-----\n--------";
        let entries = crate::entry::extract(export);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "T");
        assert_eq!(entries[0].category, "X, Y");
        assert_eq!(entries[0].body, "line1\n<strong>bold</strong>");

        assert_eq!(
            to_markdown(&entries[0]),
            "---\n\
             Title: T\n\
             Category:\n\
             - X\n\
             - Y\n\
             Date: 01/15/2023 12:00:00 AM\n\
             ---\n\n\
             line1\n\
             **bold**"
        );
    }
}
