use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One rewrite pass over the whole body text. Rules are pure; the pipeline
/// order in [`RULES`] determines correctness.
pub(super) struct Rule {
    pub name: &'static str,
    rewrite: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl Rule {
    fn new<F>(name: &'static str, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name,
            rewrite: Box::new(rewrite),
        }
    }

    /// Rule backed by a single pattern/replacement pair.
    fn replace(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        let re = Regex::new(pattern).unwrap();
        Self::new(name, move |text| {
            re.replace_all(text, replacement).into_owned()
        })
    }

    pub fn apply(&self, text: &str) -> String {
        (self.rewrite)(text)
    }
}

/// The body conversion pipeline, in application order. The ASIN card rule
/// must stay ahead of every generic tag rule: it matches a compound nested
/// structure that the link and image rules would otherwise shred.
pub(super) static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("newlines", |text| {
            text.replace("\r\n", "\n").replace('\r', "\n")
        }),
        asin_detail_rule(),
        Rule::replace("line-breaks", r"(?i)<br\s*/?>", "\n"),
        paragraph_rule(),
        Rule::replace("bold", r"<(?:strong|b)[^>]*>(.*?)</(?:strong|b)>", "**$1**"),
        Rule::replace("italic", r"<(?:em|i)[^>]*>(.*?)</(?:em|i)>", "*$1*"),
        inline_code_rule(),
        Rule::replace(
            "links",
            r#"<a[^>]+href=["']([^"']+)["'][^>]*>(.*?)</a>"#,
            "[$2]($1)",
        ),
        image_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        tidy_rule(),
    ]
});

/// Replace a Hatena ASIN product-card div (anchor URL carrying a `/dp/CODE`
/// segment) with the `[asin:CODE:detail]` shortcode. The three variants
/// overlap, so the most wrapping one is tried first; otherwise a looser match
/// would leave stray wrapper tags behind.
fn asin_detail_rule() -> Rule {
    const CARD_OPEN: &str = r#"<div\s+class="hatena-asin-detail"[^>]*>"#;
    const DP_ANCHOR: &str = r#"<a\s+[^>]*href=["'][^"']*/dp/([A-Z0-9]+)[^"']*["'][^>]*>"#;

    let variants = [
        // card wrapped in a paragraph
        Regex::new(&format!(
            r"(?s)<p[^>]*>\s*{CARD_OPEN}.*?{DP_ANCHOR}.*?</div>\s*</p>"
        ))
        .unwrap(),
        // card holding one nested child div before its close
        Regex::new(&format!(
            r"(?s){CARD_OPEN}.*?{DP_ANCHOR}.*?<div[^>]*>.*?</div>\s*</div>"
        ))
        .unwrap(),
        // bare card
        Regex::new(&format!(r"(?s){CARD_OPEN}.*?{DP_ANCHOR}.*?</div>")).unwrap(),
    ];

    Rule::new("asin-detail", move |text| {
        let mut result = text.to_string();
        for re in &variants {
            result = re.replace_all(&result, "[asin:$1:detail]").into_owned();
        }
        result
    })
}

// Opening tags vanish; closing tags become paragraph separation.
fn paragraph_rule() -> Rule {
    let open = Regex::new(r"<p[^>]*>").unwrap();
    let close = Regex::new(r"</p>").unwrap();
    Rule::new("paragraphs", move |text| {
        let text = open.replace_all(text, "");
        close.replace_all(&text, "\n\n").into_owned()
    })
}

/// The export double-escapes code samples, so the content is entity-unescaped
/// before fencing; otherwise `&lt;` and friends would end up in the Markdown.
fn inline_code_rule() -> Rule {
    let re = Regex::new(r"<code[^>]*>(.*?)</code>").unwrap();
    Rule::new("inline-code", move |text| {
        re.replace_all(text, |caps: &Captures| {
            format!("`{}`", html_escape::decode_html_entities(&caps[1]))
        })
        .into_owned()
    })
}

// src/alt attribute order varies across the export; sub-patterns are applied
// in precedence order, so the first one matching a tag instance wins.
fn image_rule() -> Rule {
    let patterns = [
        (
            Regex::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*alt=["']([^"']*)["'][^>]*/?>"#)
                .unwrap(),
            "![$2]($1)",
        ),
        (
            Regex::new(r#"<img[^>]+alt=["']([^"']*)["'][^>]*src=["']([^"']+)["'][^>]*/?>"#)
                .unwrap(),
            "![$1]($2)",
        ),
        (
            Regex::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*/?>"#).unwrap(),
            "![]($1)",
        ),
    ];
    Rule::new("images", move |text| {
        let mut result = text.to_string();
        for (re, replacement) in &patterns {
            result = re.replace_all(&result, *replacement).into_owned();
        }
        result
    })
}

// One compiled pattern per level: the regex crate has no backreferences, and
// a combined pattern would let an <h2> close an <h1>.
fn heading_rule() -> Rule {
    let levels: Vec<(Regex, String)> = (1..=6)
        .map(|level| {
            (
                Regex::new(&format!(r"<h{level}[^>]*>(.*?)</h{level}>")).unwrap(),
                format!("{} $1", "#".repeat(level)),
            )
        })
        .collect();
    Rule::new("headings", move |text| {
        levels.iter().fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, replacement.as_str()).into_owned()
        })
    })
}

/// Quote the whole span, one `> ` prefix per line, each line trimmed first.
/// Nested blockquotes terminate at the first inner closing tag; accepted
/// limitation of the non-greedy match.
fn blockquote_rule() -> Rule {
    let re = Regex::new(r"(?s)<blockquote[^>]*>(.*?)</blockquote>").unwrap();
    Rule::new("blockquotes", move |text| {
        re.replace_all(text, |caps: &Captures| {
            caps[1]
                .trim()
                .lines()
                .map(|line| format!("> {}", line.trim()))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
    })
}

// Wrapper tags are stripped (closing ones leave a newline). The item rewrite
// is global, so <ol> items get dash markers too, never numbers. No line
// ending is inserted after an item; adjacent items share a line unless the
// source already separated them.
fn list_rule() -> Rule {
    let ul_open = Regex::new(r"<ul[^>]*>").unwrap();
    let ul_close = Regex::new(r"</ul>").unwrap();
    let item = Regex::new(r"<li[^>]*>(.*?)</li>").unwrap();
    let ol_open = Regex::new(r"<ol[^>]*>").unwrap();
    let ol_close = Regex::new(r"</ol>").unwrap();
    Rule::new("lists", move |text| {
        let text = ul_open.replace_all(text, "");
        let text = ul_close.replace_all(&text, "\n");
        let text = item.replace_all(&text, "- $1");
        let text = ol_open.replace_all(&text, "");
        ol_close.replace_all(&text, "\n").into_owned()
    })
}

// Runs of blank lines collapse to a single one; the final text is trimmed.
// Idempotent, so re-rendering already-clean output is a no-op.
fn tidy_rule() -> Rule {
    let blank_runs = Regex::new(r"\n\n+").unwrap();
    Rule::new("blank-lines", move |text| {
        blank_runs.replace_all(text, "\n\n").trim().to_string()
    })
}
