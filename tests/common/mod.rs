//! Shared fixtures: deterministic embedder, model stubs, log capture
#![allow(dead_code)]

use async_trait::async_trait;
use nutrisage::embedding::{EmbeddingError, EmbeddingProvider};
use nutrisage::llm::{LanguageModel, ModelInvocationError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const DIMENSION: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
pub struct HashingEmbedder;

fn bucket(word: &str) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIMENSION as u64) as usize
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "hashing-bow"
    }
}

/// Embedder that always fails, for query-time failure paths
pub struct BrokenEmbedder;

impl EmbeddingProvider for BrokenEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::GenerationError("onnx session died".to_string()))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::GenerationError("onnx session died".to_string()))
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "broken"
    }
}

/// Hashing embedder whose single-text `embed` blocks the calling thread
pub struct SlowQueryEmbedder(pub Duration);

impl EmbeddingProvider for SlowQueryEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        std::thread::sleep(self.0);
        HashingEmbedder.embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        HashingEmbedder.embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "hashing-bow-slow"
    }
}

/// Returns the prompt it was given and remembers it
#[derive(Default)]
pub struct EchoModel {
    pub prompts: Mutex<Vec<String>>,
}

impl EchoModel {
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelInvocationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(prompt.to_string())
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

/// Always answers with the same text
pub struct FixedModel(pub String);

#[async_trait]
impl LanguageModel for FixedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
        Ok(self.0.clone())
    }

    fn model_id(&self) -> &str {
        "fixed"
    }
}

/// Fails every call with a timeout, as a client whose deadline expired would
#[derive(Default)]
pub struct TimeoutModel {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for TimeoutModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ModelInvocationError::Timeout(Duration::from_secs(30)))
    }

    fn model_id(&self) -> &str {
        "timeout"
    }
}

/// Rejects the credential
pub struct UnauthorizedModel;

#[async_trait]
impl LanguageModel for UnauthorizedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
        Err(ModelInvocationError::Auth {
            status: 401,
            message: "Invalid API Key".to_string(),
        })
    }

    fn model_id(&self) -> &str {
        "unauthorized"
    }
}

/// Answers only after `delay`
pub struct SlowModel(pub Duration);

#[async_trait]
impl LanguageModel for SlowModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }

    fn model_id(&self) -> &str {
        "slow"
    }
}

/// Counts ERROR-level events seen by the subscriber it is installed in
#[derive(Clone, Default)]
pub struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Install as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Write `files` (name, content) under `dir`
pub fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

pub fn food_corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        ("apple.txt", "Apples are rich in fiber and vitamin C."),
        ("spinach.txt", "Spinach provides iron, folate and vitamin K."),
        ("salmon.txt", "Salmon is a source of omega-3 fatty acids and vitamin D."),
        ("almond.txt", "Almonds contain vitamin E, magnesium and healthy fats."),
        ("banana.txt", "Bananas supply potassium and vitamin B6."),
    ]
}
