//! Service layer for health scoring, filtering and trend analysis.
//!
//! Services are pure functions over opportunity snapshots, plus the
//! debounce machinery that schedules filter evaluation for live input.

pub mod analyzer;
pub mod debounce;
pub mod diagnostics;
pub mod filtering;
pub mod health;
pub mod trends;

#[cfg(test)]
mod filtering_tests;

pub use analyzer::{build_health_map, HealthAnalyzer, ThresholdHealthAnalyzer};
pub use debounce::{
    DebouncedFilter, Debouncer, FilterSnapshot, OpportunitySource, StaticSource, DEFAULT_DEBOUNCE,
};
pub use diagnostics::{DiagnosticsSink, FilterFault, LogDiagnostics, RecordingDiagnostics};
pub use filtering::{filter_opportunities, filter_opportunities_with, FilterOutcome};
pub use health::{compute_aggregate_health, compute_aggregate_health_with, InsightThresholds};
pub use trends::{classify_trend, classify_trend_with, HealthHistory};
