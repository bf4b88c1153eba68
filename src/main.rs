use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{command, value_parser, Arg};
use log::{debug, info};

mod converter;
mod entry;
mod generator;
mod manifest;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .args([
            Arg::new("export_file")
                .help("Path of the MovableType export file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
            Arg::new("out_dir")
                .help("Directory path of the markdown output")
                .value_parser(value_parser!(PathBuf))
                .default_value("entries"),
            Arg::new("mt_dir")
                .help("Directory path of the per-entry MT-format copies")
                .value_parser(value_parser!(PathBuf))
                .default_value("entries_mt"),
            Arg::new("limit")
                .long("limit")
                .help("Convert only the first N entries")
                .value_parser(value_parser!(usize)),
        ])
        .get_matches();

    let export_file: &PathBuf = matches.get_one("export_file").unwrap();
    if !export_file.is_file() {
        bail!("export_file must be an existing file.");
    }
    let out_dir: &PathBuf = matches.get_one("out_dir").unwrap();
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("if out_dir exists, it must be directory.");
    }
    let mt_dir: &PathBuf = matches.get_one("mt_dir").unwrap();
    if mt_dir.exists() && !mt_dir.is_dir() {
        bail!("if mt_dir exists, it must be directory.");
    }

    let entries = entry::parse_entries(export_file)
        .with_context(|| format!("while parsing {:?}", export_file))?;
    info!("parsed {} entries from {:?}", entries.len(), export_file);

    let entries = match matches.get_one::<usize>("limit") {
        Some(&limit) if entries.len() > limit => {
            info!("limiting conversion to the first {limit} entries");
            &entries[..limit]
        }
        _ => &entries[..],
    };

    fs_extra::dir::create_all(out_dir, false)?;
    fs_extra::dir::create_all(mt_dir, false)?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let filename = generator::generate_filename(entry);

        let md_path = out_dir.join(&filename);
        std::fs::write(&md_path, converter::to_markdown(entry))
            .with_context(|| format!("while writing {:?}", md_path))?;

        let mt_path = mt_dir.join(&filename).with_extension("txt");
        std::fs::write(&mt_path, generator::generate_mt_content(entry))
            .with_context(|| format!("while writing {:?}", mt_path))?;

        debug!("converted {:?}", md_path);
        records.push(manifest::ManifestEntry::new(entry, filename));
    }

    manifest::sort_entries(&mut records);
    let manifest_path = out_dir.join("manifest.json");
    manifest::save_manifest(&manifest_path, &records)
        .with_context(|| format!("while writing {:?}", manifest_path))?;

    info!("wrote {} markdown files to {:?}", records.len(), out_dir);

    Ok(())
}
