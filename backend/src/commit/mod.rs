//! Allocation commits.
//!
//! Pending changes are persisted in batches through an [`AllocationCommitter`].
//! Each batch carries a content key so a committer can recognise a retry of a
//! batch it already applied and answer it without applying it twice.
//!
//! # Module Organization
//!
//! - [`error`]: Error types and context for commit failures
//! - [`checksum`]: Batch keys
//! - [`local`]: In-memory committer for tests and the command-line harness

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod checksum;
pub mod error;
pub mod local;

pub use checksum::{batch_key, calculate_checksum};
pub use error::{CommitError, CommitResult, ErrorContext};
pub use local::LocalCommitter;

use crate::models::PendingChange;

/// A set of pending changes submitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitBatch {
    pub batch_key: String,
    pub changes: Vec<PendingChange>,
    pub created_at: DateTime<Utc>,
}

impl CommitBatch {
    /// Build a batch, sorting the changes by opportunity id.
    pub fn new(mut changes: Vec<PendingChange>) -> CommitResult<Self> {
        changes.sort_by(|a, b| a.opportunity_id.cmp(&b.opportunity_id));
        let batch_key = batch_key(&changes)?;
        Ok(Self {
            batch_key,
            changes,
            created_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Acknowledgement of a committed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub batch_key: String,
    pub applied: usize,
    pub committed_at: DateTime<Utc>,
    /// True when the committer had already applied this batch.
    #[serde(default)]
    pub replayed: bool,
}

/// Persists batches of allocation changes.
///
/// # Error Handling
/// A returned error means nothing in the batch was persisted.
#[async_trait]
pub trait AllocationCommitter: Send + Sync {
    async fn commit(&self, batch: &CommitBatch) -> CommitResult<CommitReceipt>;
}
