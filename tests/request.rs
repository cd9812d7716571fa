mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{leaf, ms, Recorder};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use waterfall::{
    Config, ElementConfig, Event, EventKind, Request, Strategy, Subscribe, Termination,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_notifies_only_flagged_leaf() {
    let root = ElementConfig::group(Strategy::Sequential)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("plain", true, 100, 300))
        .with_child(leaf("flagged", true, 100, 300).notify_on_first_success())
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root).load(recorder.clone()).await;

    assert_eq!(recorder.loaded_calls(), strings(&["flagged"]));
    assert_eq!(
        recorder.completed_calls(),
        vec![(strings(&["plain", "flagged"]), Vec::new())]
    );
    assert_eq!(report.loaded_ids(), ["plain", "flagged"]);
    assert!(report.failed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_first_flagged_success_wins_across_subtrees() {
    let nested = ElementConfig::group(Strategy::Sequential)
        .with_id("nested")
        .with_deadline(ms(2000))
        .with_child(leaf("deep", true, 100, 300).notify_on_first_success());
    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("shallow", true, 250, 300).notify_on_first_success())
        .with_child(nested)
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root).load(recorder.clone()).await;

    assert_eq!(recorder.loaded_calls(), strings(&["deep"]));
    let mut loaded = report.loaded_ids();
    loaded.sort_unstable();
    assert_eq!(loaded, ["deep", "shallow"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_flagged_leaf_never_notifies() {
    let root = ElementConfig::group(Strategy::Sequential)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("slow", true, 500, 300).notify_on_first_success())
        .with_child(leaf("ko", false, 100, 300).notify_on_first_success())
        .with_child(leaf("ok", true, 100, 300))
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root).load(recorder.clone()).await;

    assert!(recorder.loaded_calls().is_empty());
    assert_eq!(
        recorder.completed_calls(),
        vec![(strings(&["ok"]), strings(&["slow", "ko"]))]
    );
    assert_eq!(report.failed_ids(), ["slow", "ko"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_flagged_successes_notify_once() {
    let mut root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(5000));
    for i in 0..16 {
        root = root.with_child(leaf(&format!("l{i}"), true, 10, 4000).notify_on_first_success());
    }
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root.build().unwrap())
        .load(recorder.clone())
        .await;

    assert_eq!(recorder.loaded_calls().len(), 1);
    assert_eq!(recorder.completed_calls().len(), 1);
    assert_eq!(report.loaded.len(), 16);
}

#[tokio::test(start_paused = true)]
async fn test_report_matches_completion_callback() {
    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("a", true, 100, 300))
        .with_child(leaf("b", false, 200, 300))
        .with_child(leaf("c", true, 400, 300))
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root).load(recorder.clone()).await;

    let completed = recorder.completed_calls();
    assert_eq!(completed.len(), 1);
    let (loaded, failed) = &completed[0];
    assert_eq!(report.loaded_ids(), loaded.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(report.failed_ids(), failed.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(report.loaded_ids(), ["a"]);
    let mut failed = report.failed_ids();
    failed.sort_unstable();
    assert_eq!(failed, ["b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn test_single_leaf_root() {
    let root = leaf("only", true, 100, 300)
        .notify_on_first_success()
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let report = Request::new(root).load(recorder.clone()).await;

    assert_eq!(recorder.loaded_calls(), strings(&["only"]));
    assert_eq!(report.loaded_ids(), ["only"]);
}

#[tokio::test(start_paused = true)]
async fn test_load_with_token_cancels_evaluation() {
    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("fast", true, 100, 500))
        .with_child(leaf("slow", true, 300, 500))
        .build()
        .unwrap();
    let request = Request::new(root);
    let mut rx = request.events();
    let recorder = Arc::new(Recorder::default());
    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ms(150)).await;
            token.cancel();
        })
    };

    let report = request.load_with_token(token, recorder.clone()).await;
    canceller.await.unwrap();

    assert_eq!(report.loaded_ids(), ["fast"]);
    assert!(report.failed.is_empty());
    assert_eq!(recorder.completed_calls().len(), 1);

    let events = drain(&mut rx);
    let last = events.last().unwrap();
    assert_eq!(last.kind, EventKind::RequestCompleted);
    assert_eq!(last.termination, Some(Termination::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_lifecycle() {
    let root = ElementConfig::group(Strategy::Sequential)
        .with_id("root")
        .with_deadline(ms(2000))
        .stop_on_first_success()
        .with_child(leaf("late", true, 500, 300))
        .with_child(leaf("hit", true, 100, 300).notify_on_first_success())
        .with_child(leaf("never", true, 100, 300))
        .build()
        .unwrap();
    let request = Request::new(root);
    let mut rx = request.events();

    request.load(Arc::new(Recorder::default())).await;

    let events = drain(&mut rx);
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds.first(), Some(&EventKind::RequestStarted));
    assert_eq!(kinds.last(), Some(&EventKind::RequestCompleted));
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));

    let timed_out = kinds.iter().position(|k| *k == EventKind::LeafTimedOut).unwrap();
    assert_eq!(kinds[timed_out + 1], EventKind::LeafFailed);
    assert_eq!(events[timed_out + 1].reason.as_deref(), Some("deadline"));

    let notified: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::FirstSuccessNotified)
        .collect();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].element.as_deref(), Some("hit"));

    let stopped = events
        .iter()
        .find(|e| e.kind == EventKind::GroupStopped)
        .unwrap();
    assert_eq!(stopped.element.as_deref(), Some("root"));
    assert_eq!(stopped.reason.as_deref(), Some("hit"));

    // The leaf's own event precedes everything its success triggers.
    let at = |kind: EventKind, element: &str| {
        events
            .iter()
            .position(|e| e.kind == kind && e.element.as_deref() == Some(element))
            .unwrap()
    };
    let loaded = at(EventKind::LeafLoaded, "hit");
    let notified = at(EventKind::FirstSuccessNotified, "hit");
    let stop = at(EventKind::GroupStopped, "root");
    assert!(loaded < notified && notified < stop, "{kinds:?}");

    assert!(!events
        .iter()
        .any(|e| e.element.as_deref() == Some("never")));

    let completed = events.last().unwrap();
    assert_eq!(completed.loaded, Some(1));
    assert_eq!(completed.failed, Some(1));
    assert_eq!(completed.termination, Some(Termination::Stopped));
}

#[tokio::test(start_paused = true)]
async fn test_group_deadline_event() {
    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(200))
        .with_child(leaf("slow", true, 300, 500))
        .build()
        .unwrap();
    let request = Request::new(root);
    let mut rx = request.events();

    let report = request.load(Arc::new(Recorder::default())).await;

    assert!(report.is_empty());
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| e.kind == EventKind::LeafCancelled && e.element.as_deref() == Some("slow")));
    let hit = events
        .iter()
        .find(|e| e.kind == EventKind::GroupDeadlineHit)
        .unwrap();
    assert_eq!(hit.deadline_ms, Some(200));
}

struct Collect {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_are_flushed_before_load_returns() {
    let root = ElementConfig::group(Strategy::Sequential)
        .with_id("root")
        .with_deadline(ms(2000))
        .with_child(leaf("a", true, 100, 300))
        .with_child(leaf("b", false, 100, 300))
        .build()
        .unwrap();
    let collect = Arc::new(Collect {
        kinds: Mutex::new(Vec::new()),
    });

    let subscriber: Arc<dyn Subscribe> = collect.clone();
    Request::with_config(root, &Config::default())
        .with_subscribers(vec![subscriber])
        .load(Arc::new(Recorder::default()))
        .await;

    let kinds = collect.kinds.lock().clone();
    assert_eq!(kinds.first(), Some(&EventKind::RequestStarted));
    assert_eq!(kinds.last(), Some(&EventKind::RequestCompleted));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::LeafStarting).count(),
        2
    );
}

#[cfg(feature = "logging")]
#[tokio::test(start_paused = true)]
async fn test_log_writer_handles_full_request() {
    let root = ElementConfig::group(Strategy::Parallel)
        .with_id("root")
        .with_deadline(ms(150))
        .with_child(leaf("a", true, 100, 300).notify_on_first_success())
        .with_child(leaf("b", true, 400, 300))
        .build()
        .unwrap();

    let writer: Arc<dyn Subscribe> = Arc::new(waterfall::LogWriter);
    let report = Request::new(root)
        .with_subscribers(vec![writer])
        .load(Arc::new(Recorder::default()))
        .await;

    assert_eq!(report.loaded_ids(), ["a"]);
}
