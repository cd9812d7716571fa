mod common;

use common::{leaf, ms, pairs, Outcomes};
use tokio_util::sync::CancellationToken;
use waterfall::{ElementConfig, Termination};

#[tokio::test(start_paused = true)]
async fn test_leaf_success_before_default_deadline() {
    let element = ElementConfig::leaf()
        .with_id("l")
        .with_outcome(true)
        .with_latency(ms(200))
        .build()
        .unwrap();
    let outcomes = Outcomes::new();

    let termination = element
        .evaluate(&CancellationToken::new(), outcomes.listener())
        .await;

    assert_eq!(termination, Termination::Completed);
    assert_eq!(outcomes.pairs(), pairs(&[("l", true)]));
    let at = outcomes.times()[0];
    assert!(at >= ms(200) && at < ms(210), "emitted at {at:?}");
}

#[tokio::test(start_paused = true)]
async fn test_leaf_simulated_failure_is_reported() {
    let element = leaf("l", false, 50, 300).build().unwrap();
    let outcomes = Outcomes::new();

    let termination = element
        .evaluate(&CancellationToken::new(), outcomes.listener())
        .await;

    assert_eq!(termination, Termination::Completed);
    assert_eq!(outcomes.pairs(), pairs(&[("l", false)]));
}

#[tokio::test(start_paused = true)]
async fn test_leaf_deadline_turns_success_into_failure() {
    let element = leaf("l", true, 500, 200).build().unwrap();
    let outcomes = Outcomes::new();

    let termination = element
        .evaluate(&CancellationToken::new(), outcomes.listener())
        .await;

    assert_eq!(termination, Termination::DeadlineExceeded);
    assert_eq!(outcomes.pairs(), pairs(&[("l", false)]));
    let at = outcomes.times()[0];
    assert!(at >= ms(200) && at < ms(210), "emitted at {at:?}");
}

#[tokio::test(start_paused = true)]
async fn test_leaf_latency_equal_to_deadline_times_out() {
    let element = leaf("l", true, 200, 200).build().unwrap();
    let outcomes = Outcomes::new();

    let termination = element
        .evaluate(&CancellationToken::new(), outcomes.listener())
        .await;

    assert_eq!(termination, Termination::DeadlineExceeded);
    assert_eq!(outcomes.pairs(), pairs(&[("l", false)]));
}

#[tokio::test(start_paused = true)]
async fn test_leaf_outcome_matches_expected_outcome() {
    let cases = [
        (true, 10, 20),
        (true, 20, 10),
        (false, 10, 20),
        (false, 20, 10),
        (true, 99, 100),
        (true, 100, 100),
    ];
    for (succeeded, latency, deadline) in cases {
        let element = leaf("l", succeeded, latency, deadline).build().unwrap();
        let expected = element.as_leaf().unwrap().expected_outcome();
        let outcomes = Outcomes::new();

        element
            .evaluate(&CancellationToken::new(), outcomes.listener())
            .await;

        assert_eq!(
            outcomes.pairs(),
            pairs(&[("l", expected)]),
            "succeeded={succeeded} latency={latency} deadline={deadline}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_leaf_emits_nothing() {
    let element = leaf("l", true, 200, 300).build().unwrap();
    let outcomes = Outcomes::new();
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ms(50)).await;
            token.cancel();
        })
    };
    let termination = element.evaluate(&token, outcomes.listener()).await;
    canceller.await.unwrap();

    assert_eq!(termination, Termination::Cancelled);
    assert!(outcomes.pairs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_leaf_under_cancelled_token_returns_immediately() {
    let element = leaf("l", true, 200, 300).build().unwrap();
    let outcomes = Outcomes::new();
    let token = CancellationToken::new();
    token.cancel();

    let start = tokio::time::Instant::now();
    let termination = element.evaluate(&token, outcomes.listener()).await;

    assert_eq!(termination, Termination::Cancelled);
    assert!(outcomes.pairs().is_empty());
    assert_eq!(start.elapsed(), ms(0));
}

#[tokio::test(start_paused = true)]
async fn test_stop_flag_on_leaf_has_no_effect() {
    let element = leaf("l", true, 100, 300)
        .stop_on_first_success()
        .build()
        .unwrap();
    let outcomes = Outcomes::new();

    let termination = element
        .evaluate(&CancellationToken::new(), outcomes.listener())
        .await;

    assert_eq!(termination, Termination::Completed);
    assert_eq!(outcomes.pairs(), pairs(&[("l", true)]));
}
