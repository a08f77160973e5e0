use std::collections::HashMap;

use crate::models::{AllocationChange, OpportunityId, PendingChange};

/// Uncommitted allocation edits keyed by opportunity.
///
/// One entry per opportunity: a later edit replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    entries: HashMap<OpportunityId, AllocationChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the edit for `id`, returning the replaced one.
    pub fn add(&mut self, id: OpportunityId, change: AllocationChange) -> Option<AllocationChange> {
        self.entries.insert(id, change)
    }

    pub fn get(&self, id: &OpportunityId) -> Option<&AllocationChange> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &OpportunityId) -> Option<AllocationChange> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &OpportunityId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries whose opportunity is no longer loaded.
    pub fn retain_ids<F>(&mut self, mut keep: F)
    where
        F: FnMut(&OpportunityId) -> bool,
    {
        self.entries.retain(|id, _| keep(id));
    }

    /// All entries, sorted by opportunity id.
    pub fn to_batch(&self) -> Vec<PendingChange> {
        let mut batch: Vec<PendingChange> = self
            .entries
            .iter()
            .map(|(id, change)| PendingChange {
                opportunity_id: id.clone(),
                change: change.clone(),
            })
            .collect();
        batch.sort_by(|a, b| a.opportunity_id.cmp(&b.opportunity_id));
        batch
    }

    /// Remove the entries that were committed unchanged.
    ///
    /// An entry edited again after the batch was taken no longer equals the
    /// committed payload and stays pending.
    pub fn settle(&mut self, committed: &[PendingChange]) -> usize {
        let mut removed = 0;
        for pending in committed {
            if self.entries.get(&pending.opportunity_id) == Some(&pending.change) {
                self.entries.remove(&pending.opportunity_id);
                removed += 1;
            }
        }
        removed
    }

    /// Operator banner text; `None` when there is nothing to save.
    pub fn banner(&self) -> Option<String> {
        match self.len() {
            0 => None,
            1 => Some("You have 1 unsaved change".to_string()),
            n => Some(format!("You have {} unsaved changes", n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_overwrites_existing_entry() {
        let mut pending = PendingChanges::new();
        let c1 = AllocationChange::reallocate(["GS-1"]);
        let c2 = AllocationChange::reallocate(["GS-2"]);

        assert!(pending.add("x".into(), c1.clone()).is_none());
        assert_eq!(pending.add("x".into(), c2.clone()), Some(c1));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.get(&"x".into()), Some(&c2));
    }

    #[test]
    fn test_to_batch_is_sorted() {
        let mut pending = PendingChanges::new();
        pending.add("b".into(), AllocationChange::reprioritize(2.0));
        pending.add("a".into(), AllocationChange::reprioritize(1.0));
        pending.add("c".into(), AllocationChange::reprioritize(3.0));

        let ids: Vec<String> = pending
            .to_batch()
            .into_iter()
            .map(|p| p.opportunity_id.into())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_settle_keeps_entries_edited_after_batch() {
        let mut pending = PendingChanges::new();
        pending.add("a".into(), AllocationChange::reprioritize(1.0));
        pending.add("b".into(), AllocationChange::reprioritize(2.0));
        let batch = pending.to_batch();

        pending.add("b".into(), AllocationChange::reprioritize(9.0));

        assert_eq!(pending.settle(&batch), 1);
        assert_eq!(pending.len(), 1);
        assert!(pending.contains(&"b".into()));
    }

    #[test]
    fn test_banner() {
        let mut pending = PendingChanges::new();
        assert_eq!(pending.banner(), None);

        pending.add("a".into(), AllocationChange::reprioritize(1.0));
        assert_eq!(pending.banner().as_deref(), Some("You have 1 unsaved change"));

        pending.add("b".into(), AllocationChange::reprioritize(1.0));
        assert_eq!(pending.banner().as_deref(), Some("You have 2 unsaved changes"));
    }
}
