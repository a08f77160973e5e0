//! Quality-tier and free-text filtering of opportunities.
//!
//! An opportunity is displayed iff it passes the quality-tier predicate AND the
//! search predicate. The search predicate fails open: a record whose search
//! fields cannot be read is kept and the fault goes to a [`DiagnosticsSink`].

use serde::Serialize;

use super::diagnostics::{DiagnosticsSink, FilterFault, LogDiagnostics};
use crate::models::{CollectionOpportunity, FilterState};

/// Result of a filter pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOutcome {
    /// Opportunities that passed, in input order.
    pub opportunities: Vec<CollectionOpportunity>,
    /// Faults swallowed while evaluating the search predicate.
    #[serde(skip)]
    pub faults: Vec<FilterFault>,
    /// Number of opportunities examined.
    pub evaluated: usize,
}

impl FilterOutcome {
    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.opportunities.iter().map(|o| o.id.as_str()).collect()
    }
}

/// Quality-tier predicate. With "show all" off, only unset/optimal statuses pass.
pub fn passes_quality_tier(opportunity: &CollectionOpportunity, state: &FilterState) -> bool {
    state.show_all_tiers || !opportunity.needs_review()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Search predicate against an already-normalized (lowercased) query.
///
/// Fields are checked in order (name, satellite name, status, allocated
/// sites) and the first match wins, so a broken field after a matching one is
/// never read.
pub fn matches_search(
    opportunity: &CollectionOpportunity,
    query: &str,
) -> Result<bool, FilterFault> {
    if contains(&opportunity.name, query) {
        return Ok(true);
    }

    if let Some(satellite) = &opportunity.satellite {
        let name = satellite
            .name
            .as_deref()
            .ok_or_else(|| FilterFault::MissingField {
                opportunity_id: opportunity.id.clone(),
                field: "satellite.name",
            })?;
        if contains(name, query) {
            return Ok(true);
        }
    }

    if let Some(status) = opportunity.match_status {
        if status.as_str().contains(query) {
            return Ok(true);
        }
    }

    for site in &opportunity.allocated_sites {
        if site.as_str().trim().is_empty() {
            return Err(FilterFault::InvalidField {
                opportunity_id: opportunity.id.clone(),
                field: "allocated_sites",
                detail: "empty site identifier".to_string(),
            });
        }
        if contains(site.as_str(), query) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn evaluate(
    opportunity: &CollectionOpportunity,
    state: &FilterState,
    query: Option<&str>,
    sink: &dyn DiagnosticsSink,
    faults: &mut Vec<FilterFault>,
) -> bool {
    if !passes_quality_tier(opportunity, state) {
        return false;
    }

    let Some(query) = query else {
        return true;
    };

    match matches_search(opportunity, query) {
        Ok(matched) => matched,
        Err(fault) => {
            sink.report(&fault);
            faults.push(fault);
            true
        }
    }
}

/// Whether a single opportunity is displayed under `state`.
pub fn opportunity_matches(
    opportunity: &CollectionOpportunity,
    state: &FilterState,
    sink: &dyn DiagnosticsSink,
) -> bool {
    let query = state.normalized_query();
    let mut faults = Vec::new();
    evaluate(opportunity, state, query.as_deref(), sink, &mut faults)
}

/// Filter opportunities, reporting per-item faults to `sink`.
pub fn filter_opportunities_with(
    opportunities: &[CollectionOpportunity],
    state: &FilterState,
    sink: &dyn DiagnosticsSink,
) -> FilterOutcome {
    let query = state.normalized_query();
    let mut faults = Vec::new();

    let filtered: Vec<CollectionOpportunity> = opportunities
        .iter()
        .filter(|o| evaluate(o, state, query.as_deref(), sink, &mut faults))
        .cloned()
        .collect();

    log::debug!(
        "Filtered {} of {} opportunities (query={:?}, show_all_tiers={}, faults={})",
        filtered.len(),
        opportunities.len(),
        query,
        state.show_all_tiers,
        faults.len()
    );

    FilterOutcome {
        opportunities: filtered,
        faults,
        evaluated: opportunities.len(),
    }
}

/// Filter opportunities, logging per-item faults.
pub fn filter_opportunities(
    opportunities: &[CollectionOpportunity],
    state: &FilterState,
) -> Vec<CollectionOpportunity> {
    filter_opportunities_with(opportunities, state, &LogDiagnostics).opportunities
}
