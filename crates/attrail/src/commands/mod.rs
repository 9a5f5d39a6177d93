pub mod download;
pub mod file;
pub mod flow;
pub mod stats;

use anyhow::Result;
use attestation_client::{HttpTransport, PagedFeed, ProgressObserver};
use attestation_models::AttestationRecord;
use colored::Colorize;

use crate::FeedArgs;

/// Progress printer for interactive fetches: one stderr line per page, so
/// table/CSV output on stdout stays clean.
struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn page_fetched(&mut self, page: u64, page_count: u64) {
        eprintln!("{}", format!("fetched page {page}/{page_count}").dimmed());
    }
}

pub(crate) fn fetch_feed(args: &FeedArgs) -> Result<Vec<AttestationRecord>> {
    let feed = PagedFeed::new(HttpTransport::new()?);
    let records = feed.fetch_all(&args.query(), &mut StderrProgress)?;
    Ok(records)
}
