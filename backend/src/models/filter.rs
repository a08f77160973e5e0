use serde::{Deserialize, Serialize};

/// Operator-controlled filter inputs.
///
/// The default hides every opportunity that needs review (quality filter on)
/// and applies no search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub show_all_tiers: bool,
}

impl FilterState {
    pub fn new(search_query: impl Into<String>, show_all_tiers: bool) -> Self {
        Self {
            search_query: search_query.into(),
            show_all_tiers,
        }
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn show_all(mut self) -> Self {
        self.show_all_tiers = true;
        self
    }

    /// Trimmed, lowercased query; `None` when the search predicate is a no-op.
    ///
    /// Surrounding whitespace is not part of the query: a whitespace-only
    /// query counts as empty and matches everything, and `" alpha "` searches
    /// for `"alpha"`.
    pub fn normalized_query(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_query() {
        assert_eq!(FilterState::default().normalized_query(), None);
        assert_eq!(FilterState::new("   ", false).normalized_query(), None);
        assert_eq!(
            FilterState::new(" Svalbard ", false).normalized_query().as_deref(),
            Some("svalbard")
        );
        assert_eq!(
            FilterState::new("gs 1", false).normalized_query().as_deref(),
            Some("gs 1")
        );
    }
}
