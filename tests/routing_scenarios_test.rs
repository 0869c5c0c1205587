use chrono::Duration;
use payroute::application::selector::{FixedDraws, SeededRandom};
use payroute::error::RoutingError;
use std::collections::HashMap;

mod common;

#[tokio::test]
async fn test_selection_follows_weights() {
    let (evaluator, _clock) = common::manual_evaluator();
    let selector = common::selector(evaluator, Box::new(SeededRandom::new(2024)));

    let mut picks: HashMap<String, u32> = HashMap::new();
    for _ in 0..1000 {
        let gateway = selector.select_gateway().await.unwrap();
        *picks.entry(gateway).or_default() += 1;
    }

    for (name, expected) in [("razorpay", 400), ("payu", 350), ("cashfree", 250)] {
        let got = picks.get(name).copied().unwrap_or(0) as i64;
        assert!(
            (got - expected).abs() <= 60,
            "{} picked {} times, expected about {}",
            name,
            got,
            expected
        );
    }
}

#[tokio::test]
async fn test_failing_gateway_sits_out_cooldown() {
    let (evaluator, clock) = common::manual_evaluator();

    evaluator.record_outcome("razorpay", true).await.unwrap();
    for _ in 0..4 {
        evaluator.record_outcome("razorpay", false).await.unwrap();
    }
    assert!(!evaluator.is_healthy("razorpay").await.unwrap());

    // Draws cover the whole remaining weight (payu 35 + cashfree 25).
    let selector = common::selector(
        evaluator.clone(),
        Box::new(FixedDraws::new([0, 34, 35, 59])),
    );
    let mut picked = Vec::new();
    for _ in 0..4 {
        picked.push(selector.select_gateway().await.unwrap());
    }
    assert_eq!(picked, ["payu", "payu", "cashfree", "cashfree"]);

    // Still inside the cooldown.
    clock.advance(Duration::minutes(5));
    assert!(!evaluator.is_healthy("razorpay").await.unwrap());

    clock.advance(Duration::seconds(1));
    assert!(evaluator.is_healthy("razorpay").await.unwrap());

    let selector = common::selector(evaluator, Box::new(FixedDraws::new([0])));
    assert_eq!(selector.select_gateway().await.unwrap(), "razorpay");
}

#[tokio::test]
async fn test_every_gateway_disabled() {
    let (evaluator, _clock) = common::manual_evaluator();
    for name in ["razorpay", "payu", "cashfree"] {
        for _ in 0..5 {
            evaluator.record_outcome(name, false).await.unwrap();
        }
    }

    let selector = common::selector(evaluator, Box::new(SeededRandom::new(1)));
    assert!(matches!(
        selector.select_gateway().await,
        Err(RoutingError::NoAvailableGateway)
    ));
    assert!(selector.healthy_gateway_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fresh_window_after_monitoring_span() {
    let (evaluator, clock) = common::manual_evaluator();
    for _ in 0..3 {
        evaluator.record_outcome("payu", false).await.unwrap();
    }

    clock.advance(Duration::minutes(16));
    let window = evaluator.record_outcome("payu", true).await.unwrap();
    assert_eq!(window.total_count, 1);
    assert_eq!(window.success_rate, 100.0);

    // The old window is older than twice the span after another 15 minutes.
    clock.advance(Duration::minutes(15));
    assert_eq!(evaluator.purge_stale().await.unwrap(), 1);
}
