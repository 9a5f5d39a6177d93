//! Fixed-column rendering of classified attestation events.
//!
//! Both output modes share the same column list and row projection; rows
//! appear in the record sequence's original order. Absent values render as
//! `-` in the table and as empty cells in CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use transition_engine::ClassifiedRecord;

pub const COLUMNS: [&str; 7] = [
    "nar_id",
    "repository",
    "branch",
    "date",
    "time",
    "is_compliant",
    "event",
];

fn row(record: &ClassifiedRecord) -> [String; 7] {
    [
        record.nar_id.clone().unwrap_or_default(),
        record.repository.clone().unwrap_or_default(),
        record.branch.clone().unwrap_or_default(),
        record.date.to_string(),
        record.time.to_string(),
        record.is_compliant.to_string(),
        record.event.to_string(),
    ]
}

/// Print a table to stdout, or write CSV when `out` is given.
pub fn render(records: &[ClassifiedRecord], out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => write_csv(records, path),
        None => {
            print_table(records);
            Ok(())
        }
    }
}

fn print_table(records: &[ClassifiedRecord]) {
    let rows: Vec<[String; 7]> = records.iter().map(row).collect();

    let mut widths: [usize; 7] = [0; 7];
    for (i, header) in COLUMNS.iter().enumerate() {
        widths[i] = header.len();
    }
    for cells in &rows {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.len().max(1));
        }
    }

    let header = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{:<width$}", name, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header.bold());

    for cells in &rows {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let shown = if cell.is_empty() { "-" } else { cell.as_str() };
                format!("{:<width$}", shown, width = widths[i])
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }
}

fn write_csv(records: &[ClassifiedRecord], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", COLUMNS.join(","))?;
    for record in records {
        let line = row(record)
            .iter()
            .map(|cell| csv_field(cell))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Quote a field only when it needs it (comma, quote, or newline).
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
