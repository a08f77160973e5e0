//! Diagnostics for faults swallowed by the filter.
//!
//! The filter never aborts because of a single bad record. Instead it reports
//! the fault to an injected [`DiagnosticsSink`] and keeps the record visible.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::OpportunityId;

/// A per-item fault raised while evaluating a filter predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterFault {
    #[error("opportunity {opportunity_id}: missing field {field}")]
    MissingField {
        opportunity_id: OpportunityId,
        field: &'static str,
    },

    #[error("opportunity {opportunity_id}: invalid value in {field}: {detail}")]
    InvalidField {
        opportunity_id: OpportunityId,
        field: &'static str,
        detail: String,
    },
}

impl FilterFault {
    pub fn opportunity_id(&self) -> &OpportunityId {
        match self {
            FilterFault::MissingField { opportunity_id, .. }
            | FilterFault::InvalidField { opportunity_id, .. } => opportunity_id,
        }
    }
}

/// Receiver for filter faults.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, fault: &FilterFault);
}

/// Forwards faults to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn report(&self, fault: &FilterFault) {
        log::warn!("Filter fault, keeping opportunity visible: {}", fault);
    }
}

/// A recorded fault with the time it was reported.
#[derive(Debug, Clone)]
pub struct DiagnosticEntry {
    pub timestamp: DateTime<Utc>,
    pub fault: FilterFault,
}

/// In-memory sink that keeps every reported fault.
#[derive(Clone, Default)]
pub struct RecordingDiagnostics {
    entries: Arc<RwLock<Vec<DiagnosticEntry>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.read().clone()
    }

    pub fn faults(&self) -> Vec<FilterFault> {
        self.entries.read().iter().map(|e| e.fault.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn report(&self, fault: &FilterFault) {
        log::debug!("Recording filter fault: {}", fault);
        self.entries.write().push(DiagnosticEntry {
            timestamp: Utc::now(),
            fault: fault.clone(),
        });
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<S> {
    fn report(&self, fault: &FilterFault) {
        (**self).report(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(id: &str) -> FilterFault {
        FilterFault::MissingField {
            opportunity_id: id.into(),
            field: "satellite.name",
        }
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingDiagnostics::new();
        sink.report(&missing("OPP-1"));
        sink.report(&FilterFault::InvalidField {
            opportunity_id: "OPP-2".into(),
            field: "allocated_sites",
            detail: "empty site id".to_string(),
        });

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp <= entries[1].timestamp);
        assert_eq!(entries[0].fault.opportunity_id().as_str(), "OPP-1");
        assert_eq!(entries[1].fault.opportunity_id().as_str(), "OPP-2");

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let sink = RecordingDiagnostics::new();
        let shared: Arc<dyn DiagnosticsSink> = Arc::new(sink.clone());
        shared.report(&missing("OPP-3"));
        assert_eq!(sink.faults(), vec![missing("OPP-3")]);
    }

    #[test]
    fn test_fault_display() {
        assert_eq!(
            missing("OPP-4").to_string(),
            "opportunity OPP-4: missing field satellite.name"
        );
    }
}
