//! Canonical data structures for attestation feeds.
//!
//! Every other crate in the workspace consumes these types: the client
//! deserializes `PageEnvelope` from the wire, the transition engine reads
//! `AttestationRecord`, and the CLI round-trips record sets through the
//! JSON archive format.

pub mod archive;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use archive::{load_archive, save_archive, ArchiveError};

/// One compliance-attestation event as reported by the API.
///
/// Unknown upstream fields are kept in `extra` so a downloaded archive can
/// be re-uploaded or re-read without losing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Unix timestamp (seconds) the attestation was recorded.
    pub created_at: i64,

    /// Compliance flag. Absent or null on malformed upstream records;
    /// the transition engine rejects such records instead of guessing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_compliant: Option<bool>,

    /// Name of the attested check; half of the series key.
    pub attestation_name: String,

    /// Free-form key/value annotations (NAR_ID, REPOSITORY, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Git metadata attached to the attested commit.
    #[serde(default, skip_serializing_if = "GitCommitInfo::is_empty")]
    pub git_commit_info: GitCommitInfo,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Commit metadata subset the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitCommitInfo {
    /// Branch the commit was attested on; the other half of the series key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GitCommitInfo {
    fn is_empty(&self) -> bool {
        self.branch.is_none() && self.extra.is_empty()
    }
}

/// Server-reported pagination state, re-read on every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of pages known to the server at response time.
    #[serde(default)]
    pub page_count: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One page of the remote collection.
///
/// A response missing `data` or `pagination` is treated as an empty page
/// with `page_count = 0`, which terminates the fetch loop after one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    #[serde(default)]
    pub data: Vec<AttestationRecord>,

    #[serde(default)]
    pub pagination: Pagination,
}
