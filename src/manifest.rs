// src/manifest.rs

use crate::{discover::ContentItem, error::SpiderResult};
use csv::Writer;
use log::info;
use std::{fs, path::Path};

pub const MANIFEST_FILE: &str = "manifest.csv";

/// Print the numbered content list the start index is chosen from.
pub fn print_listing(items: &[ContentItem]) {
    println!("\nFound content:");
    for (index, item) in items.iter().enumerate() {
        println!("{index}: [{}] {}", item.week_label, item.title);
    }
}

/// Write the discovered items to `<dir>/manifest.csv`.
pub fn write_manifest(dir: &Path, items: &[ContentItem]) -> SpiderResult<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(MANIFEST_FILE);
    let mut writer = Writer::from_path(&path)?;

    writer.write_record(["Index", "Week", "Title", "URL"])?;
    for (index, item) in items.iter().enumerate() {
        writer.write_record([
            index.to_string().as_str(),
            item.week_label.as_str(),
            item.title.as_str(),
            item.url.as_str(),
        ])?;
    }
    writer.flush()?;

    info!("Content list saved to {}", path.display());
    Ok(())
}
