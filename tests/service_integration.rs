//! End-to-end wiring through NutritionService

mod common;

use common::*;
use nutrisage::config::{CachePolicy, Config};
use nutrisage::responder::{ANSWER_UNAVAILABLE, INDEX_UNAVAILABLE, NUTRITION_UNAVAILABLE};
use nutrisage::NutritionService;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn config_for(corpus: &Path) -> Config {
    let mut config = Config::default();
    config.corpus.path = corpus.to_path_buf();
    config.retrieval.top_k = 2;
    config.llm.timeout = "5s".to_string();
    config
}

#[tokio::test]
async fn test_both_operations_share_one_model() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path(), &food_corpus());

    let model = Arc::new(EchoModel::default());
    let service =
        NutritionService::new(&config_for(temp.path()), Arc::new(HashingEmbedder), model.clone())
            .unwrap();

    let nutrition = service.analyze("Spinach").await;
    assert!(nutrition.contains("Spinach"));

    let answer = service.ask("Does spinach provide iron?").await;
    assert!(answer.contains("Spinach provides iron, folate and vitamin K."));
    assert!(answer.contains("Question: Does spinach provide iron?"));

    assert_eq!(model.prompts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_config_loaded_from_disk() {
    let temp = TempDir::new().unwrap();
    let corpus = temp.path().join("data");
    write_corpus(&corpus, &[("nested/oats.txt", "Oats are high in beta-glucan fiber.")]);

    let path = temp.path().join("config.toml");
    config_for(&corpus).save(&path).unwrap();
    let config = Config::load(&path).unwrap();

    let service = NutritionService::new(
        &config,
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    )
    .unwrap();

    let grounded = service.retrieval().try_ask("What fiber do oats have?").await.unwrap();
    assert_eq!(grounded.context.len(), 1);
    assert!(grounded.context[0].document.source().ends_with("oats.txt"));
}

#[tokio::test]
async fn test_fingerprint_cache_reuses_index() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path(), &food_corpus());

    let service = NutritionService::new(
        &config_for(temp.path()),
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    )
    .unwrap();

    service.ask("Which foods have potassium?").await;
    let first = service.retrieval().index().cached().unwrap();
    service.ask("Which foods have omega-3?").await;
    let second = service.retrieval().index().cached().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 5);
}

#[tokio::test]
async fn test_no_cache_policy_rebuilds_per_question() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path(), &food_corpus());

    let mut config = config_for(temp.path());
    config.indexing.cache = CachePolicy::None;
    let service = NutritionService::new(
        &config,
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    )
    .unwrap();

    let answer = service.ask("Which foods have potassium?").await;
    assert!(answer.contains("Bananas supply potassium"));
    assert!(service.retrieval().index().cached().is_none());
}

#[tokio::test]
async fn test_failures_map_to_operation_fallbacks() {
    let counter = ErrorCounter::default();
    let _guard = counter.install();

    let service = NutritionService::new(
        &config_for(Path::new("/nonexistent/nutrisage-data")),
        Arc::new(HashingEmbedder),
        Arc::new(TimeoutModel::default()),
    )
    .unwrap();

    assert_eq!(service.ask("Is kale healthy?").await, INDEX_UNAVAILABLE);
    assert_eq!(service.analyze("Kale").await, NUTRITION_UNAVAILABLE);
    assert_eq!(counter.count(), 2);
}

#[tokio::test]
async fn test_model_failure_after_build() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path(), &food_corpus());

    let service = NutritionService::new(
        &config_for(temp.path()),
        Arc::new(HashingEmbedder),
        Arc::new(UnauthorizedModel),
    )
    .unwrap();

    assert_eq!(service.ask("Is salmon healthy?").await, ANSWER_UNAVAILABLE);
    // The index itself was fine and stays cached
    assert!(service.retrieval().index().cached().is_some());
}

#[tokio::test]
async fn test_invalid_timeout_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for(temp.path());
    config.llm.timeout = "soon".to_string();

    let result = NutritionService::new(
        &config,
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_background_refresher_picks_up_new_files() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path(), &[("apple.txt", "Apples are rich in fiber.")]);

    let mut config = config_for(temp.path());
    config.indexing.refresh_interval = Some("50ms".to_string());
    let service = NutritionService::new(
        &config,
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    )
    .unwrap();

    let refresher = service.spawn_refresher(&config).unwrap().unwrap();
    let handle = service.retrieval().index().clone();

    let mut waited = Duration::ZERO;
    while handle.cached().map_or(0, |index| index.len()) != 1 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
        assert!(waited < Duration::from_secs(5), "initial build never happened");
    }

    write_corpus(temp.path(), &[("kiwi.txt", "Kiwis are packed with vitamin C.")]);
    while handle.cached().map_or(0, |index| index.len()) != 2 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
        assert!(waited < Duration::from_secs(5), "refresh never picked up kiwi.txt");
    }

    refresher.abort();
}

#[tokio::test]
async fn test_no_refresher_without_interval() {
    let temp = TempDir::new().unwrap();
    let config = config_for(temp.path());
    let service = NutritionService::new(
        &config,
        Arc::new(HashingEmbedder),
        Arc::new(EchoModel::default()),
    )
    .unwrap();

    assert!(service.spawn_refresher(&config).unwrap().is_none());
}
