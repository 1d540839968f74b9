//! Semantic index over the document corpus
//!
//! [`IndexBuilder`] loads a corpus, embeds every document and assembles an
//! [`Index`]. An index is never updated in place; a changed corpus means a
//! new build (see [`IndexHandle`] for reuse between builds).

mod cache;

pub use cache::IndexHandle;

use crate::config::{Config, IndexBackend};
use crate::corpus::{CorpusFingerprint, CorpusLoader, Document};
use crate::embedding::{
    EmbeddingError, EmbeddingProvider, HnswParams, VectorIndex, VectorIndexError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexBuildError {
    #[error("Corpus unreadable at {path:?}: {source}")]
    CorpusUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Document {path:?} is not valid UTF-8 text: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorIndexError),

    #[error("Index build task failed: {0}")]
    Task(String),
}

/// A document returned by a similarity search
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub document: Document,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Documents with their embeddings, searchable by similarity
pub struct Index {
    documents: Vec<Document>,
    vectors: VectorIndex,
    model_name: String,
    fingerprint: CorpusFingerprint,
}

impl Index {
    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn backend(&self) -> IndexBackend {
        self.vectors.backend()
    }

    /// Embedding model that produced the stored vectors
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Fingerprint of the corpus this index was built from
    pub fn fingerprint(&self) -> CorpusFingerprint {
        self.fingerprint
    }

    /// Top-k documents by similarity to `query`, most similar first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, VectorIndexError> {
        let hits = self.vectors.search(query, k)?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                self.documents
                    .get(hit.id as usize)
                    .map(|document| RetrievedDocument {
                        document: document.clone(),
                        score: hit.score,
                    })
            })
            .collect())
    }
}

/// Builds an [`Index`] from a corpus directory
pub struct IndexBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    loader: CorpusLoader,
    backend: IndexBackend,
    hnsw: HnswParams,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, loader: CorpusLoader) -> Self {
        Self {
            provider,
            loader,
            backend: IndexBackend::Exact,
            hnsw: HnswParams::default(),
            batch_size: 32,
        }
    }

    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &Config) -> Self {
        Self::new(provider, CorpusLoader::from_config(&config.corpus))
            .with_backend(config.indexing.backend)
            .with_hnsw_params(HnswParams {
                m: config.indexing.hnsw_m,
                ef_construction: config.indexing.hnsw_ef_construction,
                ef_search: config.indexing.hnsw_ef_search,
            })
            .with_batch_size(config.embedding.batch_size)
    }

    pub fn with_backend(mut self, backend: IndexBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_hnsw_params(mut self, params: HnswParams) -> Self {
        self.hnsw = params;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn loader(&self) -> &CorpusLoader {
        &self.loader
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Load, embed and index every document under `corpus_path`
    ///
    /// An empty corpus is not an error: the result is an empty index whose
    /// searches return nothing. Blocking; call from `spawn_blocking` in
    /// async contexts.
    pub fn build(&self, corpus_path: &Path) -> Result<Index, IndexBuildError> {
        let start = Instant::now();
        let corpus = self.loader.load(corpus_path)?;
        let dimension = self.provider.dimension();

        let mut vectors =
            VectorIndex::with_backend(self.backend, dimension, corpus.documents.len(), self.hnsw);

        let mut next_id = 0u64;
        for batch in corpus.documents.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.content().to_string()).collect();
            let embeddings = self.provider.embed_batch(&texts)?;

            if embeddings.len() != batch.len() {
                return Err(IndexBuildError::Embedding(EmbeddingError::GenerationError(
                    format!(
                        "Expected {} embeddings, got {}",
                        batch.len(),
                        embeddings.len()
                    ),
                )));
            }

            for embedding in embeddings {
                vectors.insert(next_id, embedding)?;
                next_id += 1;
            }
        }

        tracing::info!(
            documents = corpus.documents.len(),
            model = self.provider.model_name(),
            backend = ?self.backend,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Food knowledge index built"
        );

        Ok(Index {
            documents: corpus.documents,
            vectors,
            model_name: self.provider.model_name().to_string(),
            fingerprint: corpus.fingerprint,
        })
    }
}
