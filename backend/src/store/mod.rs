//! Injected state container for a collection deck.
//!
//! [`DeckStore`] owns the opportunity list, the health map, the filter inputs
//! and the pending-change map behind a single lock. Callers hold it by
//! reference (usually `Arc<DeckStore>`); there is no global instance.
//!
//! The lock is never held across an `.await`: a commit snapshots the pending
//! batch, releases the lock while the committer runs, then reduces the
//! outcome.

use parking_lot::RwLock;
use std::sync::Arc;

pub mod pending;
pub mod state;

pub use pending::PendingChanges;
pub use state::{CommitNotice, DeckAction, DeckState};

use crate::commit::{AllocationCommitter, CommitBatch, CommitError, CommitReceipt, CommitResult};
use crate::config::EngineConfig;
use crate::models::{
    AggregateHealth, AllocationChange, CollectionOpportunity, FilterState, HealthMap,
    OpportunityId, Trend,
};
use crate::services::analyzer::{build_health_map, HealthAnalyzer};
use crate::services::debounce::{DebouncedFilter, OpportunitySource};
use crate::services::diagnostics::DiagnosticsSink;
use crate::services::filtering::{filter_opportunities_with, FilterOutcome};
use crate::services::health::{compute_aggregate_health_with, InsightThresholds};

pub struct DeckStore {
    state: RwLock<DeckState>,
    config: EngineConfig,
    thresholds: InsightThresholds,
}

impl DeckStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: RwLock::new(DeckState::new(&config)),
            thresholds: InsightThresholds::from(&config.insights),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply an action to the deck state.
    pub fn dispatch(&self, action: DeckAction) {
        self.state.write().reduce(action);
    }

    /// Read-only access to the current state.
    pub fn read<R>(&self, f: impl FnOnce(&DeckState) -> R) -> R {
        f(&self.state.read())
    }

    /// Clone of the current state.
    pub fn state_snapshot(&self) -> DeckState {
        self.state.read().clone()
    }

    // ==================== Deck lifecycle ====================

    pub fn load_opportunities(
        &self,
        workspace_id: Option<String>,
        opportunities: Vec<CollectionOpportunity>,
    ) {
        log::info!(
            "Loading {} opportunities (workspace={:?})",
            opportunities.len(),
            workspace_id
        );
        self.dispatch(DeckAction::LoadOpportunities {
            workspace_id,
            opportunities,
        });
    }

    pub fn close_deck(&self) {
        self.dispatch(DeckAction::CloseDeck);
    }

    // ==================== Health ====================

    pub fn set_health_map(&self, map: HealthMap) {
        self.dispatch(DeckAction::SetHealthMap(map));
    }

    /// Reclassify every opportunity with `analyzer`, record the resulting
    /// score in the health history and return the aggregate.
    pub fn refresh_health(&self, analyzer: &dyn HealthAnalyzer) -> AggregateHealth {
        let mut state = self.state.write();
        let map = build_health_map(&state.opportunities, analyzer);
        state.reduce(DeckAction::SetHealthMap(map));

        let aggregate = compute_aggregate_health_with(
            &state.opportunities,
            &state.health_map,
            state.pending.len(),
            &self.thresholds,
        );
        state.reduce(DeckAction::RecordHealthScore(aggregate.health_score));
        aggregate
    }

    /// Aggregate health over the whole deck.
    pub fn aggregate_health(&self) -> AggregateHealth {
        let state = self.state.read();
        compute_aggregate_health_with(
            &state.opportunities,
            &state.health_map,
            state.pending.len(),
            &self.thresholds,
        )
    }

    /// Aggregate health over the opportunities the current filter displays.
    pub fn visible_health(&self, sink: &dyn DiagnosticsSink) -> AggregateHealth {
        let state = self.state.read();
        let visible = filter_opportunities_with(&state.opportunities, &state.filter, sink);
        compute_aggregate_health_with(
            &visible.opportunities,
            &state.health_map,
            state.pending.len(),
            &self.thresholds,
        )
    }

    pub fn health_trend(&self) -> Trend {
        self.state.read().history.trend()
    }

    // ==================== Filtering ====================

    pub fn filter_state(&self) -> FilterState {
        self.state.read().filter.clone()
    }

    pub fn set_search(&self, query: impl Into<String>) {
        self.dispatch(DeckAction::SetSearch(query.into()));
    }

    pub fn set_show_all_tiers(&self, show_all: bool) {
        self.dispatch(DeckAction::SetShowAllTiers(show_all));
    }

    /// Opportunities displayed under the current filter, evaluated now.
    pub fn visible_opportunities(&self, sink: &dyn DiagnosticsSink) -> FilterOutcome {
        let state = self.state.read();
        filter_opportunities_with(&state.opportunities, &state.filter, sink)
    }

    /// Debounced filter over this store's opportunities. Evaluated filter
    /// inputs are written back to the store.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn live_filter(self: &Arc<Self>, sink: Arc<dyn DiagnosticsSink>) -> DebouncedFilter {
        let initial = self.filter_state();
        DebouncedFilter::new(
            Arc::clone(self) as Arc<dyn OpportunitySource>,
            sink,
            initial,
            self.config.filter.debounce(),
        )
    }

    // ==================== Pending changes ====================

    pub fn add_pending_change(&self, id: impl Into<OpportunityId>, change: AllocationChange) {
        self.dispatch(DeckAction::AddPendingChange {
            id: id.into(),
            change,
        });
    }

    pub fn pending_count(&self) -> usize {
        self.state.read().unsaved_count()
    }

    pub fn pending_change(&self, id: &OpportunityId) -> Option<AllocationChange> {
        self.state.read().pending.get(id).cloned()
    }

    pub fn unsaved_banner(&self) -> Option<String> {
        self.state.read().pending.banner()
    }

    pub fn is_saving(&self) -> bool {
        self.state.read().saving
    }

    pub fn commit_notice(&self) -> Option<CommitNotice> {
        self.state.read().commit_notice.clone()
    }

    pub fn dismiss_commit_notice(&self) {
        self.dispatch(DeckAction::DismissCommitNotice);
    }

    /// Discard every pending change without persisting it.
    pub fn rollback_changes(&self) -> usize {
        let mut state = self.state.write();
        let discarded = state.pending.len();
        state.reduce(DeckAction::RollbackChanges);
        log::info!("Rolled back {} pending changes", discarded);
        discarded
    }

    /// Persist every pending change through `committer`.
    ///
    /// On success the committed entries leave the pending map and the deck's
    /// opportunities reflect them. On failure the pending map is untouched and
    /// a [`CommitNotice`] is raised; the caller may simply call this again.
    /// Dropping the returned future mid-commit leaves the pending map as it
    /// was and allows a new commit.
    pub async fn commit_changes(
        &self,
        committer: &dyn AllocationCommitter,
    ) -> CommitResult<CommitReceipt> {
        let batch = {
            let mut state = self.state.write();
            if state.saving {
                return Err(CommitError::in_progress());
            }
            let batch = CommitBatch::new(state.pending.to_batch())?;
            if batch.is_empty() {
                return Ok(CommitReceipt {
                    batch_key: batch.batch_key,
                    applied: 0,
                    committed_at: batch.created_at,
                    replayed: false,
                });
            }
            state.reduce(DeckAction::CommitStarted);
            batch
        };
        let mut guard = SavingGuard {
            state: &self.state,
            armed: true,
        };

        log::info!(
            "Committing {} pending changes (batch={})",
            batch.len(),
            batch.batch_key
        );

        let outcome = committer.commit(&batch).await;
        guard.armed = false;

        match outcome {
            Ok(receipt) => {
                if receipt.replayed {
                    log::info!("Batch {} was already committed", receipt.batch_key);
                }
                self.dispatch(DeckAction::CommitSucceeded {
                    receipt: receipt.clone(),
                    committed: batch.changes,
                });
                Ok(receipt)
            }
            Err(err) => {
                let err = err.with_operation("commit_changes");
                log::warn!("Commit failed, keeping {} pending changes: {}", batch.len(), err);
                self.dispatch(DeckAction::CommitFailed(CommitNotice::from(&err)));
                Err(err)
            }
        }
    }
}

/// Clears `saving` if a commit future is dropped before its outcome is
/// reduced, so an abandoned commit cannot block later ones.
struct SavingGuard<'a> {
    state: &'a RwLock<DeckState>,
    armed: bool,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Commit abandoned before completion, pending changes kept");
            self.state.write().reduce(DeckAction::CommitAbandoned);
        }
    }
}

impl Default for DeckStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl OpportunitySource for DeckStore {
    fn snapshot(&self) -> Vec<CollectionOpportunity> {
        self.state.read().opportunities.clone()
    }

    fn filter_applied(&self, state: &FilterState) {
        self.dispatch(DeckAction::SetFilter(state.clone()));
    }
}
