#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use deck_engine::models::{CollectionOpportunity, MatchStatus};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process-global environment so parallel tests do not observe each other.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Opportunity with a resolved satellite and one allocated site.
pub fn opportunity(id: &str, status: Option<MatchStatus>) -> CollectionOpportunity {
    let mut opp = CollectionOpportunity::new(id, format!("Pass {}", id))
        .with_satellite(format!("SAT-{}", id), Some("Sentinel-1B"))
        .with_sites([format!("GS-{}", id)]);
    opp.match_status = status;
    opp
}

/// Deck with one opportunity per match status and one without a status.
pub fn mixed_deck() -> Vec<CollectionOpportunity> {
    vec![
        opportunity("1", None),
        opportunity("2", Some(MatchStatus::Unmatched)),
        opportunity("3", Some(MatchStatus::Baseline)),
        opportunity("4", Some(MatchStatus::Suboptimal)),
        opportunity("5", Some(MatchStatus::Optimal)),
    ]
}
