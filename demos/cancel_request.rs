//! # Example: cancel_request
//!
//! Cancels a running request from the outside with [`Request::load_with_token`].
//!
//! The slow leaves are abandoned without a failure outcome; `on_completed` still fires
//! once with whatever loaded before the cancellation.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► spawn canceller: sleep 250ms ─► token.cancel()
//!   └─► load_with_token(token)
//!         ├─► quick (100ms)  ─► loaded
//!         ├─► slow  (600ms)  ─► cancelled at 250ms, nothing emitted
//!         └─► RequestCompleted { termination: cancelled }
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_request
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use waterfall::{ElementConfig, EventKind, LeafRef, Request, RequestListener, Strategy};

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
    println!("=== cancel_request example ===\n");

    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(Duration::from_secs(2))
        .with_child(
            ElementConfig::leaf()
                .with_id("quick")
                .with_outcome(true)
                .with_latency(Duration::from_millis(100))
                .notify_on_first_success(),
        )
        .with_child(
            ElementConfig::leaf()
                .with_id("slow")
                .with_outcome(true)
                .with_latency(Duration::from_millis(600))
                .with_deadline(Duration::from_secs(1)),
        )
        .build()?;

    let request = Request::new(root);
    let mut events = request.events();

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            println!("cancelling request");
            token.cancel();
        })
    };

    let report = request.load_with_token(token, Arc::new(Print)).await;
    canceller.await?;

    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::RequestCompleted {
            let termination = ev.termination.map(|t| t.as_label()).unwrap_or("unknown");
            println!("request ended: {termination}");
        }
    }
    println!("loaded: {:?}", report.loaded_ids());
    println!("failed: {:?}", report.failed_ids());
    Ok(())
}
