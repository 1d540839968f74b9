//! The two operations exposed to an outer caller (router, CLI)
use crate::config::Config;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider};
use crate::error::{NutriError, Result};
use crate::index::{IndexBuilder, IndexHandle};
use crate::llm::{ChatCompletionClient, LanguageModel};
use crate::responder::{DirectResponder, RetrievalResponder};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Nutrition lookups and corpus-grounded questions behind one handle
pub struct NutritionService {
    direct: DirectResponder,
    retrieval: RetrievalResponder,
}

impl NutritionService {
    /// Wire responders from explicit collaborators
    pub fn new(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        let timeout = config.llm.timeout()?;
        let builder = Arc::new(IndexBuilder::from_config(embedder.clone(), config));
        let handle = Arc::new(IndexHandle::new(
            builder,
            config.corpus.path.clone(),
            config.indexing.cache,
        ));

        Ok(Self {
            direct: DirectResponder::new(model.clone(), timeout),
            retrieval: RetrievalResponder::new(
                handle,
                embedder,
                model,
                config.retrieval.top_k,
                timeout,
            ),
        })
    }

    /// Production wiring: FastEmbed embeddings and the configured chat model
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = FastEmbedProvider::new(&config.embedding.model).map_err(|e| {
            NutriError::Config(format!("Embedding model unavailable: {}", e))
        })?;
        let model = ChatCompletionClient::from_config(&config.llm)?;
        Self::new(config, Arc::new(embedder), Arc::new(model))
    }

    /// Nutrition facts for a food item, or a fallback message
    pub async fn analyze(&self, food_item: &str) -> String {
        let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4());
        self.direct.analyze(food_item).instrument(span).await
    }

    /// Answer grounded in the document corpus, or a fallback message
    pub async fn ask(&self, question: &str) -> String {
        let span = tracing::info_span!("ask", request_id = %Uuid::new_v4());
        self.retrieval.ask(question).instrument(span).await
    }

    pub fn direct(&self) -> &DirectResponder {
        &self.direct
    }

    pub fn retrieval(&self) -> &RetrievalResponder {
        &self.retrieval
    }

    /// Start periodic corpus checks if the configuration asks for them
    pub fn spawn_refresher(&self, config: &Config) -> Result<Option<JoinHandle<()>>> {
        Ok(config
            .indexing
            .refresh_interval()?
            .map(|every| self.retrieval.index().clone().spawn_refresher(every)))
    }
}
