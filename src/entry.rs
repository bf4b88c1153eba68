use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context;
use chrono::NaiveDateTime;

const ENTRY_SEPARATOR: &str = "--------";
const SECTION_SEPARATOR: &str = "-----";
const BODY_START: &str = "BODY:";

/// One blog post from a MovableType export. Empty string means the field was
/// absent in the export.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Entry {
    pub author: String,
    pub title: String,
    pub basename: String,
    pub status: String,
    pub date: String,
    pub category: String,
    pub body: String,
    pub image_url: String,
}

impl Entry {
    /// Comma-separated `category` as trimmed, non-empty items.
    pub fn categories(&self) -> Vec<String> {
        self.category
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Best-effort parse of the `MM/DD/YYYY HH:MM:SS AM|PM` date field.
    /// The raw field stays verbatim in `date`; this is only for callers that
    /// want a real timestamp (e.g. the manifest).
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, "%m/%d/%Y %I:%M:%S %p").ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Header,
    Body,
}

/// Line-by-line scanner over the export format. One `step` per line; a
/// returned `Entry` is the record finalized by that line.
#[derive(Debug)]
struct Extractor {
    state: ScanState,
    current: Entry,
    body_lines: Vec<String>,
}

impl Extractor {
    fn new() -> Self {
        Self {
            state: ScanState::Header,
            current: Entry::default(),
            body_lines: Vec::new(),
        }
    }

    fn step(&mut self, line: &str) -> Option<Entry> {
        // The entry separator wins over every other sentinel, even inside a
        // body: a body line equal to it ends the record early. Quirk of the
        // export format, kept as-is.
        if line == ENTRY_SEPARATOR {
            let finished = self.take_current();
            self.state = ScanState::Header;
            return finished;
        }

        match self.state {
            ScanState::Header => match line {
                BODY_START => self.state = ScanState::Body,
                // separates the metadata block from the body block
                SECTION_SEPARATOR => {}
                _ => self.read_header_line(line),
            },
            ScanState::Body => {
                if line == SECTION_SEPARATOR {
                    self.state = ScanState::Header;
                } else {
                    self.body_lines.push(line.to_string());
                }
            }
        }

        None
    }

    /// Flush the trailing record of a stream with no closing separator.
    fn finish(mut self) -> Option<Entry> {
        self.take_current()
    }

    // A record without a title is dropped, not emitted.
    fn take_current(&mut self) -> Option<Entry> {
        let mut entry = std::mem::take(&mut self.current);
        let body_lines = std::mem::take(&mut self.body_lines);
        if entry.title.is_empty() {
            return None;
        }
        entry.body = body_lines.join("\n");
        Some(entry)
    }

    // Recognized `KEY: value` prefixes are exact and case-sensitive; repeats
    // are last-wins. Anything else in the header block is ignored.
    fn read_header_line(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("AUTHOR: ") {
            self.current.author = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("TITLE: ") {
            self.current.title = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("BASENAME: ") {
            self.current.basename = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("STATUS: ") {
            self.current.status = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("DATE: ") {
            self.current.date = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("CATEGORY: ") {
            self.current.category = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("IMAGE: ") {
            self.current.image_url = rest.to_string();
        }
    }
}

/// Extract every titled record from already-loaded export text, in document
/// order.
pub fn extract(text: &str) -> Vec<Entry> {
    let mut extractor = Extractor::new();
    let mut entries = Vec::new();
    for line in text.lines() {
        if let Some(entry) = extractor.step(line) {
            entries.push(entry);
        }
    }
    if let Some(entry) = extractor.finish() {
        entries.push(entry);
    }
    entries
}

/// Extract records from an export file, streaming it line by line. Fails only
/// on I/O; malformed content degrades to a best-effort parse.
pub fn parse_entries(path: &Path) -> anyhow::Result<Vec<Entry>> {
    let fd = File::open(path).with_context(|| format!("while opening {:?}", path))?;
    let reader = BufReader::new(fd);

    let mut extractor = Extractor::new();
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("while reading {:?}", path))?;
        if let Some(entry) = extractor.step(&line) {
            entries.push(entry);
        }
    }
    if let Some(entry) = extractor.finish() {
        entries.push(entry);
    }

    Ok(entries)
}
