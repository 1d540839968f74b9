use super::{complete_within, require_text, retrieval_prompt, settle, Operation, ResponderError};
use crate::embedding::EmbeddingProvider;
use crate::index::{Index, IndexHandle, RetrievedDocument};
use crate::llm::{LanguageModel, ModelInvocationError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Model answer together with the passages it was grounded on
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub answer: String,
    /// Most similar first
    pub context: Vec<RetrievedDocument>,
}

/// Answers free-form questions from the indexed corpus
pub struct RetrievalResponder {
    index: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
    timeout: Duration,
}

impl RetrievalResponder {
    pub fn new(
        index: Arc<IndexHandle>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn LanguageModel>,
        top_k: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            index,
            embedder,
            model,
            top_k,
            timeout,
        }
    }

    pub fn index(&self) -> &Arc<IndexHandle> {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question`, returning a fixed fallback string on any failure
    pub async fn ask(&self, question: &str) -> String {
        let result = self.try_ask(question).await.map(|grounded| grounded.answer);
        if result.is_ok() {
            info!(question, "Query executed");
        }
        settle(Operation::Ask, question, result)
    }

    /// Obtain the current index and answer against it
    pub async fn try_ask(&self, question: &str) -> Result<GroundedAnswer, ResponderError> {
        require_text(question, "question")?;
        let index = self.index.current().await?;
        self.ask_with_retrieval(question, &index).await
    }

    /// Retrieve the top-k passages for `question` from `index` and let the
    /// model answer with them as context
    pub async fn ask_with_retrieval(
        &self,
        question: &str,
        index: &Index,
    ) -> Result<GroundedAnswer, ResponderError> {
        let question = require_text(question, "question")?;

        let query = self.embed_query(question).await?;

        let context = index.search(&query, self.top_k)?;
        debug!(
            question,
            retrieved = context.len(),
            indexed = index.len(),
            "Retrieved context"
        );

        let prompt = retrieval_prompt(question, &context);
        let answer = complete_within(self.model.as_ref(), &prompt, self.timeout).await?;

        Ok(GroundedAnswer { answer, context })
    }

    /// Embed the question off the async worker; model inference is blocking
    async fn embed_query(&self, question: &str) -> Result<Vec<f32>, ModelInvocationError> {
        let embedder = self.embedder.clone();
        let question = question.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&question))
            .await
            .map_err(|e| ModelInvocationError::Embedding(format!("embedding task failed: {e}")))?
            .map_err(|e| ModelInvocationError::Embedding(e.to_string()))
    }
}
