//! # Collection Deck Engine
//!
//! Health scoring and filtering for satellite ground-station collection decks.
//!
//! This crate backs the operations dashboard used to review and manually
//! override collection-pass assignments. It decides which opportunities an
//! operator sees, how healthy the deck is, and which allocation edits are
//! still waiting to be saved.
//!
//! ## Features
//!
//! - **Health scoring**: Aggregate per-opportunity classifications into a 0-100 score with advisories
//! - **Filtering**: Quality-tier and free-text search, failing open on bad records
//! - **Debounce**: Cancellable timer so live search only evaluates settled input
//! - **Trends**: Classify a health-score series as increasing, decreasing or stable
//! - **Pending changes**: Track, commit and roll back allocation edits
//!
//! ## Architecture
//!
//! - [`models`]: Opportunity, health, filter and pending-change types
//! - [`services`]: Health aggregation, filtering, debounce, trends, diagnostics
//! - [`store`]: Injected state container and reducer for one deck
//! - [`commit`]: Allocation-commit collaborator trait, batches and errors
//! - [`config`]: TOML configuration with environment overrides

pub mod commit;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use store::DeckStore;
