//! Deck state and its reducer.
//!
//! All mutation goes through [`DeckState::reduce`], so the same transitions
//! apply whether an action comes from an operator event or from a completed
//! commit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::pending::PendingChanges;
use crate::commit::{CommitError, CommitReceipt};
use crate::config::EngineConfig;
use crate::models::{
    AllocationChange, CollectionOpportunity, FilterState, HealthMap, OpportunityId, PendingChange,
};
use crate::services::trends::HealthHistory;

/// Dismissible error shown after a failed commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitNotice {
    pub message: String,
    pub retryable: bool,
    pub raised_at: DateTime<Utc>,
}

impl From<&CommitError> for CommitNotice {
    fn from(err: &CommitError) -> Self {
        Self {
            message: err.to_string(),
            retryable: err.is_retryable(),
            raised_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DeckAction {
    /// Replace the loaded deck.
    LoadOpportunities {
        workspace_id: Option<String>,
        opportunities: Vec<CollectionOpportunity>,
    },
    SetHealthMap(HealthMap),
    RecordHealthScore(u32),
    SetSearch(String),
    SetShowAllTiers(bool),
    SetFilter(FilterState),
    AddPendingChange {
        id: OpportunityId,
        change: AllocationChange,
    },
    RollbackChanges,
    CommitStarted,
    CommitSucceeded {
        receipt: CommitReceipt,
        committed: Vec<PendingChange>,
    },
    CommitFailed(CommitNotice),
    /// The commit was dropped before the committer answered.
    CommitAbandoned,
    DismissCommitNotice,
    CloseDeck,
}

/// Everything the dashboard shows for one collection deck.
#[derive(Debug, Clone)]
pub struct DeckState {
    pub workspace_id: Option<String>,
    pub opportunities: Vec<CollectionOpportunity>,
    pub health_map: HealthMap,
    pub filter: FilterState,
    pub pending: PendingChanges,
    pub saving: bool,
    pub commit_notice: Option<CommitNotice>,
    pub last_commit: Option<CommitReceipt>,
    pub history: HealthHistory,
}

impl DeckState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            workspace_id: None,
            opportunities: Vec::new(),
            health_map: HealthMap::new(),
            filter: FilterState {
                search_query: String::new(),
                show_all_tiers: config.filter.show_all_tiers,
            },
            pending: PendingChanges::new(),
            saving: false,
            commit_notice: None,
            last_commit: None,
            history: HealthHistory::from_settings(&config.trends),
        }
    }

    pub fn reduce(&mut self, action: DeckAction) {
        match action {
            DeckAction::LoadOpportunities {
                workspace_id,
                opportunities,
            } => {
                let ids: HashSet<&OpportunityId> = opportunities.iter().map(|o| &o.id).collect();
                let before = self.pending.len();
                self.pending.retain_ids(|id| ids.contains(id));
                self.health_map.retain(|id, _| ids.contains(id));
                if self.pending.len() < before {
                    log::info!(
                        "Dropped {} pending changes for opportunities no longer in the deck",
                        before - self.pending.len()
                    );
                }
                if workspace_id.is_some() && workspace_id != self.workspace_id {
                    self.history.clear();
                }
                if workspace_id.is_some() {
                    self.workspace_id = workspace_id;
                }
                self.opportunities = opportunities;
            }
            DeckAction::SetHealthMap(map) => self.health_map = map,
            DeckAction::RecordHealthScore(score) => self.history.record(f64::from(score)),
            DeckAction::SetSearch(query) => self.filter.search_query = query,
            DeckAction::SetShowAllTiers(show_all) => self.filter.show_all_tiers = show_all,
            DeckAction::SetFilter(filter) => self.filter = filter,
            DeckAction::AddPendingChange { id, change } => {
                self.pending.add(id, change);
            }
            DeckAction::RollbackChanges => {
                self.pending.clear();
                self.commit_notice = None;
            }
            DeckAction::CommitStarted => {
                self.saving = true;
                self.commit_notice = None;
            }
            DeckAction::CommitSucceeded { receipt, committed } => {
                for change in &committed {
                    self.apply_committed(change);
                }
                self.pending.settle(&committed);
                self.last_commit = Some(receipt);
                self.saving = false;
            }
            DeckAction::CommitFailed(notice) => {
                self.saving = false;
                self.commit_notice = Some(notice);
            }
            DeckAction::CommitAbandoned => self.saving = false,
            DeckAction::DismissCommitNotice => self.commit_notice = None,
            DeckAction::CloseDeck => {
                let show_all_tiers = self.filter.show_all_tiers;
                self.workspace_id = None;
                self.opportunities.clear();
                self.health_map.clear();
                self.filter = FilterState {
                    search_query: String::new(),
                    show_all_tiers,
                };
                self.pending.clear();
                self.saving = false;
                self.commit_notice = None;
                self.last_commit = None;
                self.history.clear();
            }
        }
    }

    fn apply_committed(&mut self, pending: &PendingChange) {
        let Some(opportunity) = self
            .opportunities
            .iter_mut()
            .find(|o| o.id == pending.opportunity_id)
        else {
            log::warn!(
                "Committed change for unknown opportunity {}",
                pending.opportunity_id
            );
            return;
        };

        let change = &pending.change;
        if let Some(sites) = &change.allocated_sites {
            opportunity.allocated_sites = sites.clone();
        }
        if let Some(priority) = change.priority {
            opportunity.priority = priority;
        }
        if let Some(status) = change.match_status {
            opportunity.match_status = Some(status);
        }
    }

    /// Count shown in the unsaved-changes banner.
    pub fn unsaved_count(&self) -> usize {
        self.pending.len()
    }
}
