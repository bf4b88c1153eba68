use std::{cmp::Ordering, fs::OpenOptions, io::BufWriter, path::Path};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entry::Entry;

/// One line of the conversion manifest: the produced file plus the metadata a
/// reader of the output directory would want without re-parsing the export.
#[derive(Serialize, Debug)]
pub struct ManifestEntry {
    pub file: String,
    pub title: String,
    pub date: Option<NaiveDateTime>,
    pub categories: Vec<String>,
}

impl ManifestEntry {
    pub fn new(entry: &Entry, file: String) -> Self {
        Self {
            file,
            title: entry.title.clone(),
            date: entry.parsed_date(),
            categories: entry.categories(),
        }
    }
}

// ordering by date(descending). if both are undated, compare by title.
pub fn sort_entries(entries: &mut [ManifestEntry]) {
    entries.sort_by(|a, b| match (a.date, b.date) {
        (Some(ref a_date), Some(ref b_date)) => b_date.cmp(a_date),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => b.title.cmp(&a.title),
    });
}

pub fn save_manifest(path: &Path, entries: &[ManifestEntry]) -> anyhow::Result<()> {
    let fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let writer = BufWriter::new(fd);
    serde_json::to_writer_pretty(writer, entries)?;

    Ok(())
}
