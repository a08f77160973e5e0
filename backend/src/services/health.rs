//! Aggregate health scoring and actionable insights.

use crate::config::InsightSettings;
use crate::models::{AggregateHealth, CollectionOpportunity, HealthLevel, HealthMap, Insight, InsightKind};

/// Thresholds controlling which insights are raised.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightThresholds {
    /// Raise the critical insight when `critical > critical_threshold`.
    pub critical_threshold: usize,
    /// Raise the capacity insight when `warning > warning_threshold`.
    pub warning_threshold: usize,
    /// Raise the batch-commit insight when `pending > pending_threshold`.
    pub pending_threshold: usize,
    /// Raise the below-optimal insight when `optimal < total * optimal_ratio_floor`.
    pub optimal_ratio_floor: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self::from(&InsightSettings::default())
    }
}

impl From<&InsightSettings> for InsightThresholds {
    fn from(settings: &InsightSettings) -> Self {
        Self {
            critical_threshold: settings.critical_threshold,
            warning_threshold: settings.warning_threshold,
            pending_threshold: settings.pending_threshold,
            optimal_ratio_floor: settings.optimal_ratio_floor,
        }
    }
}

/// Rounded percentage of `optimal` over `total`; 0 for an empty set.
pub fn health_score(optimal: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (optimal as f64 / total as f64 * 100.0).round() as u32
}

/// Derive advisory messages from aggregate counts.
///
/// Conditions that do not hold simply produce no insight.
pub fn derive_insights(
    total: usize,
    critical: usize,
    warning: usize,
    optimal: usize,
    pending_changes: usize,
    thresholds: &InsightThresholds,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if critical > thresholds.critical_threshold {
        insights.push(Insight {
            kind: InsightKind::CriticalAttention,
            message: format!("{} opportunities need immediate attention", critical),
        });
    }

    if warning > thresholds.warning_threshold {
        insights.push(Insight {
            kind: InsightKind::CapacityWarning,
            message: format!("{} opportunities approaching capacity limits", warning),
        });
    }

    if pending_changes > thresholds.pending_threshold {
        insights.push(Insight {
            kind: InsightKind::BatchCommit,
            message: format!(
                "{} pending changes, consider batch committing",
                pending_changes
            ),
        });
    }

    if total > 0 && (optimal as f64) < total as f64 * thresholds.optimal_ratio_floor {
        insights.push(Insight {
            kind: InsightKind::BelowOptimal,
            message: "System operating below optimal capacity".to_string(),
        });
    }

    insights
}

/// Aggregate health with the default insight thresholds.
pub fn compute_aggregate_health(
    opportunities: &[CollectionOpportunity],
    health_map: &HealthMap,
    pending_changes: usize,
) -> AggregateHealth {
    compute_aggregate_health_with(
        opportunities,
        health_map,
        pending_changes,
        &InsightThresholds::default(),
    )
}

/// Aggregate the per-opportunity health classification of `opportunities`.
///
/// Opportunities missing from `health_map` count as optimal, which keeps
/// `optimal + critical + warning == total`.
pub fn compute_aggregate_health_with(
    opportunities: &[CollectionOpportunity],
    health_map: &HealthMap,
    pending_changes: usize,
    thresholds: &InsightThresholds,
) -> AggregateHealth {
    let total = opportunities.len();
    if total == 0 {
        return AggregateHealth {
            insights: derive_insights(0, 0, 0, 0, pending_changes, thresholds),
            ..AggregateHealth::empty()
        };
    }

    let (critical, warning) =
        opportunities
            .iter()
            .fold((0, 0), |(critical, warning), o| match health_map.get(&o.id) {
                Some(HealthLevel::Critical) => (critical + 1, warning),
                Some(HealthLevel::Warning) => (critical, warning + 1),
                _ => (critical, warning),
            });
    let optimal = total - critical - warning;

    AggregateHealth {
        total,
        critical,
        warning,
        optimal,
        health_score: health_score(optimal, total),
        insights: derive_insights(total, critical, warning, optimal, pending_changes, thresholds),
    }
}
