//! Per-opportunity health classification.
//!
//! Production decks receive their classification from the health-analysis
//! collaborator. [`ThresholdHealthAnalyzer`] is the local stand-in used by the
//! command-line harness and tests.

use crate::models::{CollectionOpportunity, HealthLevel, HealthMap, IssueSeverity, MatchStatus};

/// Classifies a single opportunity.
pub trait HealthAnalyzer: Send + Sync {
    fn classify(&self, opportunity: &CollectionOpportunity) -> HealthLevel;
}

/// Rule-based analyzer over match status, integrity issues and capacity.
#[derive(Debug, Clone)]
pub struct ThresholdHealthAnalyzer {
    /// Capacity percentage at or above which an opportunity is critical.
    pub critical_capacity: f64,
    /// Capacity percentage at or above which an opportunity is a warning.
    pub warning_capacity: f64,
}

impl Default for ThresholdHealthAnalyzer {
    fn default() -> Self {
        Self {
            critical_capacity: 95.0,
            warning_capacity: 80.0,
        }
    }
}

impl HealthAnalyzer for ThresholdHealthAnalyzer {
    fn classify(&self, opportunity: &CollectionOpportunity) -> HealthLevel {
        let has_critical_issue = opportunity
            .data_integrity_issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Critical);

        if opportunity.match_status == Some(MatchStatus::Unmatched)
            || has_critical_issue
            || opportunity.capacity_percentage >= self.critical_capacity
        {
            return HealthLevel::Critical;
        }

        let has_any_issue = opportunity
            .data_integrity_issues
            .iter()
            .any(|i| i.severity != IssueSeverity::Info);

        if matches!(
            opportunity.match_status,
            Some(MatchStatus::Baseline) | Some(MatchStatus::Suboptimal)
        ) || has_any_issue
            || opportunity.capacity_percentage >= self.warning_capacity
        {
            return HealthLevel::Warning;
        }

        HealthLevel::Optimal
    }
}

/// Apply `analyzer` to every opportunity.
pub fn build_health_map(
    opportunities: &[CollectionOpportunity],
    analyzer: &dyn HealthAnalyzer,
) -> HealthMap {
    opportunities
        .iter()
        .map(|o| (o.id.clone(), analyzer.classify(o)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataIntegrityIssue;

    fn issue(severity: IssueSeverity) -> DataIntegrityIssue {
        DataIntegrityIssue {
            kind: "stale_tle".to_string(),
            severity,
            message: String::new(),
        }
    }

    #[test]
    fn test_classify_by_status() {
        let analyzer = ThresholdHealthAnalyzer::default();
        let unset = CollectionOpportunity::new("1", "a");
        assert_eq!(analyzer.classify(&unset), HealthLevel::Optimal);

        let unmatched = CollectionOpportunity::new("2", "b").with_status(MatchStatus::Unmatched);
        assert_eq!(analyzer.classify(&unmatched), HealthLevel::Critical);

        let baseline = CollectionOpportunity::new("3", "c").with_status(MatchStatus::Baseline);
        assert_eq!(analyzer.classify(&baseline), HealthLevel::Warning);
    }

    #[test]
    fn test_classify_by_capacity() {
        let analyzer = ThresholdHealthAnalyzer::default();
        let busy = CollectionOpportunity::new("1", "a").with_capacity(85.0);
        assert_eq!(analyzer.classify(&busy), HealthLevel::Warning);

        let full = CollectionOpportunity::new("2", "b").with_capacity(97.5);
        assert_eq!(analyzer.classify(&full), HealthLevel::Critical);
    }

    #[test]
    fn test_classify_by_issue_severity() {
        let analyzer = ThresholdHealthAnalyzer::default();
        let info = CollectionOpportunity::new("1", "a").with_issue(issue(IssueSeverity::Info));
        assert_eq!(analyzer.classify(&info), HealthLevel::Optimal);

        let warn = CollectionOpportunity::new("2", "b").with_issue(issue(IssueSeverity::Warning));
        assert_eq!(analyzer.classify(&warn), HealthLevel::Warning);

        let crit = CollectionOpportunity::new("3", "c").with_issue(issue(IssueSeverity::Critical));
        assert_eq!(analyzer.classify(&crit), HealthLevel::Critical);
    }

    #[test]
    fn test_build_health_map_covers_all() {
        let opps = vec![
            CollectionOpportunity::new("1", "a"),
            CollectionOpportunity::new("2", "b").with_status(MatchStatus::Unmatched),
        ];
        let map = build_health_map(&opps, &ThresholdHealthAnalyzer::default());
        assert_eq!(map.len(), 2);
        assert_eq!(map[&opps[1].id], HealthLevel::Critical);
    }
}
