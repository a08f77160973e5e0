//! Checksums for commit batch deduplication.

use sha2::{Digest, Sha256};

use crate::models::PendingChange;

/// Calculate SHA-256 checksum of serialized content.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Key identifying a batch of changes. `changes` must already be sorted by
/// opportunity id so the same edits always hash the same.
pub fn batch_key(changes: &[PendingChange]) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(changes)?;
    Ok(calculate_checksum(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AllocationChange;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"test": "data"}"#;
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
        assert_eq!(calculate_checksum(content).len(), 64);
    }

    #[test]
    fn test_batch_key_changes_with_payload() {
        let change = AllocationChange::reallocate(["GS-1"]);
        let a = vec![PendingChange {
            opportunity_id: "OPP-1".into(),
            change: change.clone(),
        }];
        let b = vec![PendingChange {
            opportunity_id: "OPP-2".into(),
            change,
        }];

        assert_eq!(batch_key(&a).unwrap(), batch_key(&a).unwrap());
        assert_ne!(batch_key(&a).unwrap(), batch_key(&b).unwrap());
    }
}
