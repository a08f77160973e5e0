//! In-memory allocation committer.
//!
//! Stores committed allocations in a `HashMap`, which makes it suitable for
//! unit tests and for running the command-line harness without a backend.
//! Failures can be injected to exercise the error paths.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error::{CommitError, CommitResult, ErrorContext};
use super::{AllocationCommitter, CommitBatch, CommitReceipt};
use crate::models::{AllocationChange, OpportunityId};

#[derive(Default)]
struct LocalData {
    allocations: HashMap<OpportunityId, AllocationChange>,
    applied_batches: HashSet<String>,
    rejected_ids: HashSet<OpportunityId>,
    commit_calls: usize,
    is_healthy: bool,
}

/// In-memory committer.
#[derive(Clone)]
pub struct LocalCommitter {
    data: Arc<RwLock<LocalData>>,
}

impl LocalCommitter {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                is_healthy: true,
                ..Default::default()
            })),
        }
    }

    /// Simulate the commit service being unreachable.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Reject any batch that touches `id`.
    pub fn reject_opportunity(&self, id: impl Into<OpportunityId>) {
        self.data.write().rejected_ids.insert(id.into());
    }

    pub fn clear_rejections(&self) {
        self.data.write().rejected_ids.clear();
    }

    /// Last committed allocation for `id`.
    pub fn allocation(&self, id: &OpportunityId) -> Option<AllocationChange> {
        self.data.read().allocations.get(id).cloned()
    }

    pub fn allocation_count(&self) -> usize {
        self.data.read().allocations.len()
    }

    /// Number of commit attempts received, including failed and replayed ones.
    pub fn commit_calls(&self) -> usize {
        self.data.read().commit_calls
    }
}

impl Default for LocalCommitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AllocationCommitter for LocalCommitter {
    async fn commit(&self, batch: &CommitBatch) -> CommitResult<CommitReceipt> {
        let mut data = self.data.write();
        data.commit_calls += 1;

        if !data.is_healthy {
            return Err(CommitError::connection("Commit service unavailable")
                .with_operation("commit")
                .with_batch_key(batch.batch_key.clone()));
        }

        if data.applied_batches.contains(&batch.batch_key) {
            log::debug!("Batch {} already applied, replaying receipt", batch.batch_key);
            return Ok(CommitReceipt {
                batch_key: batch.batch_key.clone(),
                applied: batch.len(),
                committed_at: Utc::now(),
                replayed: true,
            });
        }

        if let Some(rejected) = batch
            .changes
            .iter()
            .find(|c| data.rejected_ids.contains(&c.opportunity_id))
        {
            return Err(CommitError::rejected_with_context(
                "Allocation rejected by commit service",
                ErrorContext::new("commit")
                    .with_batch_key(batch.batch_key.clone())
                    .with_opportunity_id(&rejected.opportunity_id)
                    .with_details(format!("{} changes in batch", batch.len())),
            ));
        }

        for pending in &batch.changes {
            data.allocations
                .insert(pending.opportunity_id.clone(), pending.change.clone());
        }
        data.applied_batches.insert(batch.batch_key.clone());

        Ok(CommitReceipt {
            batch_key: batch.batch_key.clone(),
            applied: batch.len(),
            committed_at: Utc::now(),
            replayed: false,
        })
    }
}
