#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use waterfall::{ElementConfig, LeafRef, Outcome, OutcomeListener, RequestListener};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Leaf with explicit outcome, latency and deadline.
pub fn leaf(id: &str, succeeded: bool, latency: u64, deadline: u64) -> ElementConfig {
    ElementConfig::leaf()
        .with_id(id)
        .with_outcome(succeeded)
        .with_latency(ms(latency))
        .with_deadline(ms(deadline))
}

/// Collects `(leaf id, succeeded, elapsed since creation)` for every outcome.
#[derive(Clone)]
pub struct Outcomes {
    seen: Arc<Mutex<Vec<(String, bool, Duration)>>>,
    start: Instant,
}

impl Outcomes {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            start: Instant::now(),
        }
    }

    pub fn listener(&self) -> OutcomeListener {
        let seen = Arc::clone(&self.seen);
        let start = self.start;
        Arc::new(move |o: &Outcome| {
            seen.lock()
                .push((o.leaf.id().to_string(), o.succeeded, start.elapsed()));
        })
    }

    /// Outcomes in delivery order.
    pub fn pairs(&self) -> Vec<(String, bool)> {
        self.seen
            .lock()
            .iter()
            .map(|(id, ok, _)| (id.clone(), *ok))
            .collect()
    }

    /// Outcomes sorted by leaf id, for parallel groups.
    pub fn sorted(&self) -> Vec<(String, bool)> {
        let mut pairs = self.pairs();
        pairs.sort();
        pairs
    }

    pub fn times(&self) -> Vec<Duration> {
        self.seen.lock().iter().map(|(_, _, t)| *t).collect()
    }
}

pub fn pairs(items: &[(&str, bool)]) -> Vec<(String, bool)> {
    items.iter().map(|(id, ok)| (id.to_string(), *ok)).collect()
}

/// Records every request-level callback.
#[derive(Default)]
pub struct Recorder {
    pub loaded: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<(Vec<String>, Vec<String>)>>,
}

impl Recorder {
    pub fn loaded_calls(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }

    pub fn completed_calls(&self) -> Vec<(Vec<String>, Vec<String>)> {
        self.completed.lock().clone()
    }
}

fn ids(leaves: &[LeafRef]) -> Vec<String> {
    leaves.iter().map(|l| l.id().to_string()).collect()
}

impl RequestListener for Recorder {
    fn on_loaded(&self, leaf: &LeafRef) {
        self.loaded.lock().push(leaf.id().to_string());
    }

    fn on_completed(&self, loaded: &[LeafRef], failed: &[LeafRef]) {
        self.completed.lock().push((ids(loaded), ids(failed)));
    }
}
