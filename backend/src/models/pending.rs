use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::opportunity::{MatchStatus, OpportunityId, SiteId};

/// An operator edit to an opportunity's allocation that has not been committed.
///
/// `None` fields leave the corresponding attribute untouched when the change
/// is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationChange {
    pub allocated_sites: Option<BTreeSet<SiteId>>,
    pub priority: Option<f64>,
    pub match_status: Option<MatchStatus>,
    #[serde(default)]
    pub justification: Option<String>,
    pub edited_at: DateTime<Utc>,
}

impl AllocationChange {
    /// A change that reallocates the opportunity to `sites`.
    pub fn reallocate<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SiteId>,
    {
        Self {
            allocated_sites: Some(sites.into_iter().map(Into::into).collect()),
            priority: None,
            match_status: None,
            justification: None,
            edited_at: Utc::now(),
        }
    }

    /// A change that only overrides the priority.
    pub fn reprioritize(priority: f64) -> Self {
        Self {
            allocated_sites: None,
            priority: Some(priority),
            match_status: None,
            justification: None,
            edited_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.match_status = Some(status);
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }
}

/// A pending change paired with the opportunity it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub opportunity_id: OpportunityId,
    pub change: AllocationChange,
}
