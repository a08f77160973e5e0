//! Debounced evaluation of the opportunity filter.
//!
//! [`Debouncer`] defers a callback until its input has been quiet for a fixed
//! delay. At most one timer is live: every new call aborts the previous timer
//! and bumps a generation counter, so a timer that lost the race can never run
//! its callback. [`DebouncedFilter`] uses it to re-run the filter only once the
//! operator stops typing.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::diagnostics::DiagnosticsSink;
use super::filtering::{filter_opportunities_with, FilterOutcome};
use crate::models::{CollectionOpportunity, FilterState};

/// Default quiet period before a search is evaluated.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Cancellable, rescheduling delay in front of a callback.
pub struct Debouncer<T> {
    delay: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    slot: Arc<Mutex<TimerSlot>>,
    runtime: Handle,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::with_handle(Handle::current(), delay, callback)
    }

    pub fn with_handle<F>(runtime: Handle, delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            slot: Arc::new(Mutex::new(TimerSlot::default())),
            runtime,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending value.
    pub fn call(&self, value: T) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        let generation = slot.generation;

        if let Some(previous) = slot.handle.take() {
            previous.abort();
            log::debug!("Debounce timer rescheduled (generation {})", generation);
        }

        let shared = Arc::clone(&self.slot);
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        slot.handle = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = shared.lock();
                if slot.generation != generation {
                    return;
                }
                slot.handle = None;
            }
            callback(value);
        }));
    }

    /// Drop the pending value, if any, without running the callback.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }

    /// Whether a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().handle.is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }
}

/// Supplies the opportunities a debounced filter runs over.
pub trait OpportunitySource: Send + Sync {
    fn snapshot(&self) -> Vec<CollectionOpportunity>;

    /// Called after a filter state has been evaluated.
    fn filter_applied(&self, _state: &FilterState) {}
}

/// Fixed opportunity list.
pub struct StaticSource(RwLock<Vec<CollectionOpportunity>>);

impl StaticSource {
    pub fn new(opportunities: Vec<CollectionOpportunity>) -> Self {
        Self(RwLock::new(opportunities))
    }

    pub fn replace(&self, opportunities: Vec<CollectionOpportunity>) {
        *self.0.write() = opportunities;
    }
}

impl OpportunitySource for StaticSource {
    fn snapshot(&self) -> Vec<CollectionOpportunity> {
        self.0.read().clone()
    }
}

/// Filter result together with the inputs that produced it.
#[derive(Debug, Clone, Default)]
pub struct FilterSnapshot {
    pub state: FilterState,
    pub outcome: FilterOutcome,
}

struct Evaluator {
    source: Arc<dyn OpportunitySource>,
    sink: Arc<dyn DiagnosticsSink>,
    results: watch::Sender<Arc<FilterSnapshot>>,
    /// Revision of the last published snapshot.
    published: Mutex<u64>,
    evaluations: AtomicUsize,
}

impl Evaluator {
    /// Evaluate `state` and publish it unless a newer revision was already
    /// published, in which case the newer snapshot is returned unchanged.
    fn run(&self, revision: u64, state: FilterState) -> Arc<FilterSnapshot> {
        let opportunities = self.source.snapshot();
        let outcome = filter_opportunities_with(&opportunities, &state, self.sink.as_ref());

        let mut published = self.published.lock();
        if revision < *published {
            log::debug!(
                "Discarding filter revision {} (revision {} already published)",
                revision,
                *published
            );
            return Arc::clone(&self.results.borrow());
        }
        *published = revision;

        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.source.filter_applied(&state);
        let snapshot = Arc::new(FilterSnapshot { state, outcome });
        self.results.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

/// Filter inputs as last edited, tagged with a revision that increases on
/// every edit.
struct PendingInput {
    revision: u64,
    state: FilterState,
}

impl PendingInput {
    fn edit(&mut self, f: impl FnOnce(&mut FilterState)) -> (u64, FilterState) {
        f(&mut self.state);
        self.revision += 1;
        (self.revision, self.state.clone())
    }
}

/// Live filter: search edits are debounced, toggles apply immediately.
///
/// Every evaluation carries the revision of the input it was computed from
/// and only publishes if no later revision has been published, so a timer
/// that fires while a toggle is being applied cannot overwrite the toggle.
pub struct DebouncedFilter {
    evaluator: Arc<Evaluator>,
    debouncer: Debouncer<(u64, FilterState)>,
    pending: Mutex<PendingInput>,
}

impl DebouncedFilter {
    /// Create a live filter and evaluate `initial` right away.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        source: Arc<dyn OpportunitySource>,
        sink: Arc<dyn DiagnosticsSink>,
        initial: FilterState,
        delay: Duration,
    ) -> Self {
        let (results, _) = watch::channel(Arc::new(FilterSnapshot::default()));
        let evaluator = Arc::new(Evaluator {
            source,
            sink,
            results,
            published: Mutex::new(0),
            evaluations: AtomicUsize::new(0),
        });

        let worker = Arc::clone(&evaluator);
        let debouncer = Debouncer::new(delay, move |(revision, state): (u64, FilterState)| {
            worker.run(revision, state);
        });

        evaluator.run(0, initial.clone());

        Self {
            evaluator,
            debouncer,
            pending: Mutex::new(PendingInput {
                revision: 0,
                state: initial,
            }),
        }
    }

    /// Record a search edit; evaluation happens once input is quiet.
    pub fn set_search(&self, query: impl Into<String>) {
        let query = query.into();
        let input = self.pending.lock().edit(|state| state.search_query = query);
        self.debouncer.call(input);
    }

    /// Toggle the quality-tier filter and evaluate immediately.
    ///
    /// Any search edit still waiting on the debounce timer is folded into this
    /// evaluation.
    pub fn set_show_all_tiers(&self, show_all: bool) -> Arc<FilterSnapshot> {
        let (revision, state) = self
            .pending
            .lock()
            .edit(|state| state.show_all_tiers = show_all);
        self.debouncer.cancel();
        self.evaluator.run(revision, state)
    }

    /// Re-run the filter with the current inputs, skipping the debounce.
    pub fn refresh(&self) -> Arc<FilterSnapshot> {
        let (revision, state) = self.pending.lock().edit(|_| {});
        self.debouncer.cancel();
        self.evaluator.run(revision, state)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FilterSnapshot>> {
        self.evaluator.results.subscribe()
    }

    pub fn latest(&self) -> Arc<FilterSnapshot> {
        Arc::clone(&self.evaluator.results.borrow())
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Number of filter evaluations published so far.
    pub fn evaluations(&self) -> usize {
        self.evaluator.evaluations.load(Ordering::SeqCst)
    }
}
