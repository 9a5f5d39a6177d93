use std::path::Path;

use anyhow::Result;
use attestation_models::load_archive;
use colored::Colorize;
use transition_engine::{classify, TransitionEvent};

pub fn run(data_file: &Path) -> Result<()> {
    let records = load_archive(data_file)?;
    let classified = classify(&records)?;

    let span = (
        classified.iter().map(|c| (c.date, c.time)).min(),
        classified.iter().map(|c| (c.date, c.time)).max(),
    );
    let (Some(from), Some(to)) = span else {
        println!("{}", "archive contains no records".yellow());
        return Ok(());
    };

    let regressions = classified
        .iter()
        .filter(|c| c.event == TransitionEvent::BecameNonCompliant)
        .count();

    println!("{}", "Date range:".bright_yellow().bold());
    println!("  From: {} {}", from.0, from.1);
    println!("  To:   {} {}", to.0, to.1);
    println!();
    println!(
        "There were {} became-non-compliant events",
        regressions.to_string().bright_red().bold()
    );
    Ok(())
}
