//! # Example: waterfall
//!
//! Loads a two-tier waterfall described in TOML and prints the final report.
//!
//! Shows how to:
//! - Describe a tree with [`ElementConfig::from_toml`]
//! - Receive the first-success notification and the completion callback
//! - Watch lifecycle events through the built-in `LogWriter` (requires "logging" feature)
//!
//! ## Flow
//! ```text
//! waterfall (sequential, 2s)
//!   ├─► tier-1 (parallel, 400ms, stop on first success)
//!   │     ├─► network-a: fails after 120ms
//!   │     ├─► network-b: loads after 180ms ─► on_loaded, tier-1 stops
//!   │     └─► network-c: would load after 350ms, cancelled
//!   └─► fallback: loads after 50ms
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example waterfall --features logging
//! ```

use std::sync::Arc;

use waterfall::{ElementConfig, LeafRef, Request, RequestListener, Subscribe};

const TREE: &str = r#"
id = "waterfall"
strategy = "sequential"
deadline = "2s"

[[children]]
id = "tier-1"
strategy = "parallel"
deadline = "400ms"
stop_on_first_success = true

[[children.children]]
id = "network-a"
completion_latency = "120ms"

[[children.children]]
id = "network-b"
simulated_outcome = true
completion_latency = "180ms"
notify_on_first_success = true

[[children.children]]
id = "network-c"
simulated_outcome = true
completion_latency = "350ms"
deadline = "500ms"
notify_on_first_success = true

[[children]]
id = "fallback"
simulated_outcome = true
completion_latency = "50ms"
"#;

struct Print;

impl RequestListener for Print {
    fn on_loaded(&self, leaf: &LeafRef) {
        println!("first fill from {}", leaf.id());
    }

    fn on_completed(&self, loaded: &[LeafRef], failed: &[LeafRef]) {
        println!("completed: loaded={} failed={}", loaded.len(), failed.len());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    println!("=== waterfall example ===\n");

    // 1. Build the tree
    let root = ElementConfig::from_toml(TREE)?.build()?;

    // 2. Optional: add subscriber to see events (requires "logging" feature)
    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(waterfall::LogWriter)];
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    // 3. Load
    let report = Request::new(root)
        .with_subscribers(subs)
        .load(Arc::new(Print))
        .await;

    println!("\nloaded: {:?}", report.loaded_ids());
    println!("failed: {:?}", report.failed_ids());
    Ok(())
}
