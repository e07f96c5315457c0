//! List aggregate domain model.
//!
//! # Responsibility
//! - Define the canonical contact `Record` and the `List`/`Shard` aggregate.
//! - Enforce aggregate invariants before persistence and after reads.
//!
//! # Invariants
//! - `total_records == records.len()` and `shard_count == shards.len()`.
//! - Shard records, concatenated in shard order, reproduce the parent
//!   record sequence exactly (contiguous partition, no reorder/dup/loss).
//! - A persisted `List` is immutable; there is no update path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for one uploaded list aggregate.
pub type ListId = Uuid;

/// Identifier of a field agent, owned by the identity collaborator.
///
/// The engine treats this as a weak reference: it never validates agent
/// lifecycle beyond existence at distribution time.
pub type AgentId = Uuid;

/// Canonical contact entry. All fields default to empty string when the
/// source data does not carry them; no field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub first_name: String,
    pub phone: String,
    pub notes: String,
}

impl Record {
    pub fn new(
        first_name: impl Into<String>,
        phone: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            phone: phone.into(),
            notes: notes.into(),
        }
    }
}

/// One agent's contiguous allotment within a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    pub agent_id: AgentId,
    pub records: Vec<Record>,
}

/// Agent identity handed to the partitioner by the identity collaborator.
///
/// Order of a fetched agent sequence must stay stable for the duration of
/// one distribution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRef {
    pub id: AgentId,
    pub display_name: String,
}

/// Aggregate root for one upload: the full record set plus its per-agent
/// shards, created atomically and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Stable aggregate id, assigned at creation.
    pub id: ListId,
    /// Opaque name of the staged artifact that produced this list.
    pub stored_file_ref: String,
    /// Human-readable source filename, used for export naming.
    pub original_name: String,
    /// Always equal to `records.len()`.
    pub total_records: usize,
    /// Full record set in source row order.
    pub records: Vec<Record>,
    /// Per-agent shards in distribution order.
    pub shards: Vec<Shard>,
    /// Always equal to `shards.len()`.
    pub shard_count: usize,
    /// Creation timestamp in epoch milliseconds, immutable.
    pub created_at: i64,
}

/// Metadata-only view of a list, for lightweight listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: ListId,
    pub original_name: String,
    pub total_records: usize,
    pub shard_count: usize,
    pub created_at: i64,
}

/// Violation of an aggregate invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    /// `total_records` disagrees with the record sequence length.
    TotalRecordsMismatch { declared: usize, actual: usize },
    /// `shard_count` disagrees with the shard sequence length.
    ShardCountMismatch { declared: usize, actual: usize },
    /// Shard records do not reconstruct the parent record sequence.
    BrokenPartition,
}

impl Display for ListValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalRecordsMismatch { declared, actual } => write!(
                f,
                "total_records is {declared} but list holds {actual} records"
            ),
            Self::ShardCountMismatch { declared, actual } => {
                write!(f, "shard_count is {declared} but list holds {actual} shards")
            }
            Self::BrokenPartition => {
                write!(f, "shard records do not reconstruct the list record sequence")
            }
        }
    }
}

impl Error for ListValidationError {}

impl List {
    /// Assembles a new aggregate with a generated id and creation timestamp.
    ///
    /// Counters are derived from the payload, so a freshly assembled list
    /// satisfies the count invariants by construction. The partition
    /// invariant is still checked on persistence via [`List::validate`].
    pub fn new(
        stored_file_ref: impl Into<String>,
        original_name: impl Into<String>,
        records: Vec<Record>,
        shards: Vec<Shard>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stored_file_ref: stored_file_ref.into(),
            original_name: original_name.into(),
            total_records: records.len(),
            shard_count: shards.len(),
            records,
            shards,
            created_at: epoch_ms_now(),
        }
    }

    /// Returns the summary projection of this aggregate.
    pub fn summary(&self) -> ListSummary {
        ListSummary {
            id: self.id,
            original_name: self.original_name.clone(),
            total_records: self.total_records,
            shard_count: self.shard_count,
            created_at: self.created_at,
        }
    }

    /// Looks up the shard assigned to one agent, if any.
    pub fn shard_for(&self, agent_id: AgentId) -> Option<&Shard> {
        self.shards.iter().find(|shard| shard.agent_id == agent_id)
    }

    /// Checks every aggregate invariant.
    pub fn validate(&self) -> Result<(), ListValidationError> {
        if self.total_records != self.records.len() {
            return Err(ListValidationError::TotalRecordsMismatch {
                declared: self.total_records,
                actual: self.records.len(),
            });
        }
        if self.shard_count != self.shards.len() {
            return Err(ListValidationError::ShardCountMismatch {
                declared: self.shard_count,
                actual: self.shards.len(),
            });
        }

        let mut cursor = 0usize;
        for shard in &self.shards {
            let end = cursor + shard.records.len();
            if end > self.records.len() || self.records[cursor..end] != shard.records[..] {
                return Err(ListValidationError::BrokenPartition);
            }
            cursor = end;
        }
        if cursor != self.records.len() {
            return Err(ListValidationError::BrokenPartition);
        }

        Ok(())
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn epoch_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
