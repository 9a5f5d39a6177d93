//! Compliance-transition classification.
//!
//! Records belong to a series identified by (`attestation_name`, `branch`).
//! Within a series, each record's event is derived from the change of its
//! compliance flag relative to the previous record of the same series,
//! where "previous" means previous in arrival order, not in `created_at`
//! order. A series' first observation has no prior state and is handled by
//! the [`PriorCompliance::Unknown`] arm of the transition table.
//!
//! Pure transformation: no I/O, input records are never mutated.

use std::collections::HashMap;
use std::fmt;

use attestation_models::AttestationRecord;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("attestation '{attestation_name}' at {created_at} has no is_compliant flag")]
    MissingCompliance {
        attestation_name: String,
        created_at: i64,
    },

    #[error("attestation '{attestation_name}' has unrepresentable created_at {created_at}")]
    BadTimestamp {
        attestation_name: String,
        created_at: i64,
    },
}

/// Compliance state of the previous record in a series.
///
/// A tagged tri-state instead of a nullable bool: the "no prior record"
/// case must stay distinguishable from both real flag values everywhere
/// the pair is matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorCompliance {
    Unknown,
    Known(bool),
}

/// Categorical transition derived from (prior, current) compliance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionEvent {
    BecameCompliant,
    BecameNonCompliant,
    StayedCompliant,
    StayedNonCompliant,
}

impl TransitionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionEvent::BecameCompliant => "became-compliant",
            TransitionEvent::BecameNonCompliant => "became-non-compliant",
            TransitionEvent::StayedCompliant => "stayed-compliant",
            TransitionEvent::StayedNonCompliant => "stayed-non-compliant",
        }
    }
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table. Total over every legal (prior, current) pair, so
/// an unmapped pair cannot exist at runtime.
///
/// A series first seen compliant records no event (optimistic: treated as
/// having been compliant all along), while a series first seen
/// non-compliant is flagged as a fresh non-compliance. The asymmetry is
/// deliberate.
pub fn transition(prior: PriorCompliance, is_compliant: bool) -> TransitionEvent {
    match (prior, is_compliant) {
        (PriorCompliance::Unknown, true) => TransitionEvent::StayedCompliant,
        (PriorCompliance::Unknown, false) => TransitionEvent::BecameNonCompliant,
        (PriorCompliance::Known(false), true) => TransitionEvent::BecameCompliant,
        (PriorCompliance::Known(true), false) => TransitionEvent::BecameNonCompliant,
        (PriorCompliance::Known(true), true) => TransitionEvent::StayedCompliant,
        (PriorCompliance::Known(false), false) => TransitionEvent::StayedNonCompliant,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    attestation_name: String,
    branch: Option<String>,
}

/// An input record plus every derived field.
#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub record: AttestationRecord,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub nar_id: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub prev_is_compliant: PriorCompliance,
    pub is_compliant: bool,
    pub event: TransitionEvent,
}

/// Classify a record sequence.
///
/// Output order equals input order; series grouping is purely an internal
/// device for the prior-flag computation. A single pass with a per-series
/// last-flag map gives each record the flag of the series' previous
/// arrival without ever re-sorting the input.
pub fn classify(records: &[AttestationRecord]) -> Result<Vec<ClassifiedRecord>, ClassifyError> {
    let mut last_seen: HashMap<SeriesKey, bool> = HashMap::new();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let is_compliant =
            record
                .is_compliant
                .ok_or_else(|| ClassifyError::MissingCompliance {
                    attestation_name: record.attestation_name.clone(),
                    created_at: record.created_at,
                })?;

        let ts = DateTime::from_timestamp(record.created_at, 0).ok_or_else(|| {
            ClassifyError::BadTimestamp {
                attestation_name: record.attestation_name.clone(),
                created_at: record.created_at,
            }
        })?;

        let branch = record.git_commit_info.branch.clone();
        let key = SeriesKey {
            attestation_name: record.attestation_name.clone(),
            branch: branch.clone(),
        };

        let prior = match last_seen.get(&key) {
            Some(&flag) => PriorCompliance::Known(flag),
            None => PriorCompliance::Unknown,
        };
        let event = transition(prior, is_compliant);
        last_seen.insert(key, is_compliant);

        out.push(ClassifiedRecord {
            date: ts.date_naive(),
            time: ts.time(),
            nar_id: record.annotations.get("NAR_ID").cloned(),
            repository: record.annotations.get("REPOSITORY").cloned(),
            branch,
            prev_is_compliant: prior,
            is_compliant,
            event,
            record: record.clone(),
        });
    }

    Ok(out)
}
