//! Collection opportunity records.
//!
//! An opportunity is a candidate assignment of a satellite overpass to one or
//! more ground collection sites. Records are produced by the collection-loading
//! collaborator and only change through committed allocation edits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

crate::define_string_id!(OpportunityId);
crate::define_string_id!(SatelliteId);
crate::define_string_id!(SiteId);

/// Quality label of an opportunity's current allocation.
///
/// An opportunity without a status is treated the same as [`MatchStatus::Optimal`]
/// by the quality-tier filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Baseline,
    Suboptimal,
    Unmatched,
    Optimal,
}

impl MatchStatus {
    /// Lowercase label, as shown to operators and matched by search.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Baseline => "baseline",
            MatchStatus::Suboptimal => "suboptimal",
            MatchStatus::Unmatched => "unmatched",
            MatchStatus::Optimal => "optimal",
        }
    }

    /// Statuses hidden by the quality-tier filter unless "show all" is on.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            MatchStatus::Baseline | MatchStatus::Suboptimal | MatchStatus::Unmatched
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the satellite flying the pass.
///
/// `name` is resolved by the loading collaborator and may be missing when the
/// satellite catalog lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteRef {
    pub id: SatelliteId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Info,
}

/// A data-integrity problem flagged on an opportunity (stale TLE, missing
/// contact window, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIntegrityIssue {
    pub kind: String,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOpportunity {
    pub id: OpportunityId,
    pub name: String,
    #[serde(default)]
    pub satellite: Option<SatelliteRef>,
    #[serde(default)]
    pub match_status: Option<MatchStatus>,
    #[serde(default)]
    pub priority: f64,
    #[serde(default)]
    pub allocated_sites: BTreeSet<SiteId>,
    #[serde(default)]
    pub data_integrity_issues: Vec<DataIntegrityIssue>,
    #[serde(default)]
    pub capacity_percentage: f64,
}

impl CollectionOpportunity {
    /// Create an opportunity with no satellite, status, sites or issues.
    pub fn new(id: impl Into<OpportunityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            satellite: None,
            match_status: None,
            priority: 0.0,
            allocated_sites: BTreeSet::new(),
            data_integrity_issues: Vec::new(),
            capacity_percentage: 0.0,
        }
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.match_status = Some(status);
        self
    }

    pub fn with_satellite(mut self, id: impl Into<SatelliteId>, name: Option<&str>) -> Self {
        self.satellite = Some(SatelliteRef {
            id: id.into(),
            name: name.map(str::to_string),
        });
        self
    }

    pub fn with_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SiteId>,
    {
        self.allocated_sites = sites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_capacity(mut self, capacity_percentage: f64) -> Self {
        self.capacity_percentage = capacity_percentage;
        self
    }

    pub fn with_issue(mut self, issue: DataIntegrityIssue) -> Self {
        self.data_integrity_issues.push(issue);
        self
    }

    /// Whether the quality-tier filter hides this opportunity by default.
    pub fn needs_review(&self) -> bool {
        self.match_status.is_some_and(|s| s.needs_review())
    }
}

/// Parse a list of opportunities from the loader's JSON payload.
///
/// Accepts either a bare array or a `{"opportunities": [...]}` wrapper.
pub fn parse_opportunities_json(json: &str) -> Result<Vec<CollectionOpportunity>, serde_json::Error> {
    #[derive(Deserialize)]
    struct Wrapper {
        opportunities: Vec<CollectionOpportunity>,
    }

    match serde_json::from_str::<Vec<CollectionOpportunity>>(json) {
        Ok(list) => Ok(list),
        Err(_) => serde_json::from_str::<Wrapper>(json).map(|w| w.opportunities),
    }
}
