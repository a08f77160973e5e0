use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::opportunity::OpportunityId;

/// Per-opportunity health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Critical,
    Warning,
    Optimal,
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthLevel::Critical => "critical",
            HealthLevel::Warning => "warning",
            HealthLevel::Optimal => "optimal",
        };
        f.write_str(label)
    }
}

/// Health classification keyed by opportunity, as produced by a health analyzer.
pub type HealthMap = HashMap<OpportunityId, HealthLevel>;

/// Aggregate health of a set of opportunities.
///
/// `optimal` is always `total - critical - warning`, so it also covers
/// opportunities the health map has no entry for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateHealth {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub optimal: usize,
    /// Rounded percentage of optimal opportunities, 0 for an empty set.
    pub health_score: u32,
    pub insights: Vec<Insight>,
}

impl AggregateHealth {
    pub fn empty() -> Self {
        Self {
            total: 0,
            critical: 0,
            warning: 0,
            optimal: 0,
            health_score: 0,
            insights: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CriticalAttention,
    CapacityWarning,
    BatchCommit,
    BelowOptimal,
}

/// Advisory message derived from aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

/// Direction of a numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}
