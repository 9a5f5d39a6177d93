use std::path::Path;

use anyhow::Result;
use attestation_models::save_archive;
use colored::Colorize;

use crate::commands::fetch_feed;
use crate::FeedArgs;

pub fn run(feed: &FeedArgs, output_file: &Path) -> Result<()> {
    let records = fetch_feed(feed)?;
    save_archive(output_file, &records)?;

    println!(
        "{} {}",
        "✅ Saved".bright_green(),
        format!("{} records to {}", records.len(), output_file.display()).bright_white()
    );
    Ok(())
}
