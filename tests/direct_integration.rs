//! Food-item lookups answered from model knowledge alone

mod common;

use common::*;
use nutrisage::responder::{emphasize_list_markers, DirectResponder, NUTRITION_UNAVAILABLE};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_list_markers_emphasized_after_analyze() {
    let responder = DirectResponder::new(
        Arc::new(FixedModel("1. Vitamin E: 25mg per 100g".to_string())),
        Duration::from_secs(5),
    );

    let raw = responder.analyze("Almonds").await;
    assert_eq!(raw, "1. Vitamin E: 25mg per 100g");

    let formatted = emphasize_list_markers(&raw);
    assert!(formatted.contains("\n\n**Vitamin E**:"));
    assert!(formatted.ends_with(" 25mg per 100g"));
}

#[tokio::test]
async fn test_prompt_names_the_food() {
    let model = Arc::new(EchoModel::default());
    let responder = DirectResponder::new(model.clone(), Duration::from_secs(5));

    responder.analyze("  Greek yogurt ").await;

    let prompt = model.last_prompt().unwrap();
    assert!(prompt.contains("Greek yogurt"));
    assert!(!prompt.contains("  Greek yogurt "));
}

#[tokio::test]
async fn test_multi_item_breakdown() {
    let answer = "Nutrition for almonds:\n\
                  1. Calories: 579 kcal\n\
                  2. Protein: 21g\n\
                  3. Vitamin E: 25mg";
    let responder = DirectResponder::new(
        Arc::new(FixedModel(answer.to_string())),
        Duration::from_secs(5),
    );

    let formatted = emphasize_list_markers(&responder.analyze("Almonds").await);

    for label in ["Calories", "Protein", "Vitamin E"] {
        assert!(formatted.contains(&format!("\n\n**{label}**:")), "{formatted}");
    }
    assert!(formatted.starts_with("Nutrition for almonds:"));
}

#[tokio::test]
async fn test_timeout_returns_fallback_and_logs_once() {
    let counter = ErrorCounter::default();
    let _guard = counter.install();

    let model = Arc::new(TimeoutModel::default());
    let responder = DirectResponder::new(model.clone(), Duration::from_secs(5));

    let answer = responder.analyze("Almonds").await;

    assert_eq!(answer, "Unable to fetch Nutrition Info");
    assert_eq!(answer, NUTRITION_UNAVAILABLE);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_deadline_expiry_returns_fallback() {
    let counter = ErrorCounter::default();
    let _guard = counter.install();

    let responder = DirectResponder::new(
        Arc::new(SlowModel(Duration::from_secs(10))),
        Duration::from_millis(50),
    );

    let err = responder.try_analyze("Lentils").await.unwrap_err();
    assert_eq!(err.kind(), "timeout");
    assert_eq!(counter.count(), 0);

    assert_eq!(responder.analyze("Lentils").await, NUTRITION_UNAVAILABLE);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_rejected_credential_returns_fallback() {
    let counter = ErrorCounter::default();
    let _guard = counter.install();

    let responder = DirectResponder::new(Arc::new(UnauthorizedModel), Duration::from_secs(5));

    assert_eq!(responder.analyze("Oats").await, NUTRITION_UNAVAILABLE);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_empty_food_item_never_reaches_model() {
    let model = Arc::new(EchoModel::default());
    let responder = DirectResponder::new(model.clone(), Duration::from_secs(5));

    assert_eq!(responder.analyze("").await, NUTRITION_UNAVAILABLE);
    assert_eq!(responder.analyze(" \t").await, NUTRITION_UNAVAILABLE);
    assert!(model.last_prompt().is_none());
}

#[tokio::test]
async fn test_calls_are_independent() {
    let responder = DirectResponder::new(
        Arc::new(FixedModel("1. Fiber: 7g".to_string())),
        Duration::from_secs(5),
    );

    let (first, second) = tokio::join!(responder.analyze("Pears"), responder.analyze("Figs"));
    assert_eq!(first, second);
}
