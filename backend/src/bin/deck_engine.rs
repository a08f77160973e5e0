//! Collection deck command-line harness.
//!
//! Loads a deck of opportunities from JSON, classifies them with the
//! rule-based analyzer, applies the operator filter and prints a JSON summary.
//!
//! # Usage
//!
//! ```bash
//! deck-engine opportunities.json
//! deck-engine opportunities.json --search svalbard --show-all
//! deck-engine opportunities.json --config deck-engine.toml
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `DECK_DEBOUNCE_MS`: Overrides `[filter] debounce_ms`
//! - `DECK_SHOW_ALL_TIERS`: Overrides `[filter] show_all_tiers`

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use deck_engine::models::{parse_opportunities_json, AggregateHealth, CollectionOpportunity, Trend};
use deck_engine::services::{LogDiagnostics, RecordingDiagnostics, ThresholdHealthAnalyzer};
use deck_engine::{DeckStore, EngineConfig};

#[derive(Parser, Debug)]
#[command(about = "Score and filter a collection deck")]
struct Args {
    /// Opportunities JSON (a bare array or an object with an `opportunities` array)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Case-insensitive search over name, satellite, status and sites
    #[arg(short = 's', long, value_name = "QUERY")]
    search: Option<String>,

    /// Also show baseline, suboptimal and unmatched opportunities
    #[arg(long)]
    show_all: bool,

    /// Configuration file (defaults to `deck-engine.toml` lookup)
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary<'a> {
    deck: &'a AggregateHealth,
    visible: &'a AggregateHealth,
    trend: Trend,
    displayed: Vec<&'a CollectionOpportunity>,
    filter_faults: Vec<String>,
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?.apply_env_overrides()?,
        None => EngineConfig::from_env()?,
    };
    info!(debounce_ms = config.filter.debounce_ms, "Configuration loaded");

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let opportunities = parse_opportunities_json(&content)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let store = Arc::new(DeckStore::new(config));
    store.load_opportunities(None, opportunities);
    if let Some(query) = args.search {
        store.set_search(query);
    }
    if args.show_all {
        store.set_show_all_tiers(true);
    }

    let deck = store.refresh_health(&ThresholdHealthAnalyzer::default());
    let recorder = RecordingDiagnostics::new();
    let outcome = store.visible_opportunities(&recorder);
    let visible = store.visible_health(&LogDiagnostics);

    for fault in recorder.faults() {
        warn!(%fault, "Opportunity kept visible despite filter fault");
    }
    info!(
        total = deck.total,
        displayed = outcome.len(),
        health_score = deck.health_score,
        "Deck evaluated"
    );

    let summary = Summary {
        deck: &deck,
        visible: &visible,
        trend: store.health_trend(),
        displayed: outcome.opportunities.iter().collect(),
        filter_faults: outcome.faults.iter().map(ToString::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
