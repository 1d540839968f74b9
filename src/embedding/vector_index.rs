/// Vector index for similarity search: exact cosine scan or HNSW
use crate::config::IndexBackend;
use crate::embedding::cosine_similarity;
use hnsw_rs::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound on HNSW layers accepted by hnsw_rs
const HNSW_MAX_LAYER: usize = 16;

/// hnsw_rs aborts the process for a larger `max_nb_connection`
pub const HNSW_MAX_CONNECTIONS: usize = 256;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Duplicate id: {0}")]
    DuplicateId(u64),
}

/// Search result with ID and similarity score
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// ID of the item (position of the document in the index)
    pub id: u64,
    /// Cosine similarity score (higher is more similar)
    pub score: f32,
}

/// HNSW tuning knobs
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
        }
    }
}

enum Backend {
    Exact,
    Hnsw {
        graph: Hnsw<'static, f32, DistCosine>,
        ef_search: usize,
    },
}

/// Immutable-after-build vector index
///
/// Entries are added once while the index is assembled; a changed corpus
/// produces a new index rather than mutating this one.
pub struct VectorIndex {
    backend: Backend,
    /// Vectors in insertion order; both backends score against these
    vectors: Vec<(u64, Vec<f32>)>,
    /// id -> position in `vectors`
    positions: HashMap<u64, usize>,
    dimension: usize,
}

impl VectorIndex {
    /// Create an exact (brute-force cosine) index
    pub fn exact(dimension: usize) -> Self {
        Self {
            backend: Backend::Exact,
            vectors: Vec::new(),
            positions: HashMap::new(),
            dimension,
        }
    }

    /// Create an HNSW index sized for `capacity` vectors
    ///
    /// `params.m` is clamped to [`HNSW_MAX_CONNECTIONS`].
    pub fn hnsw(dimension: usize, capacity: usize, params: HnswParams) -> Self {
        let graph = Hnsw::<f32, DistCosine>::new(
            params.m.clamp(1, HNSW_MAX_CONNECTIONS),
            capacity.max(1),
            HNSW_MAX_LAYER,
            params.ef_construction,
            DistCosine,
        );

        Self {
            backend: Backend::Hnsw {
                graph,
                ef_search: params.ef_search,
            },
            vectors: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            dimension,
        }
    }

    /// Create an index for the configured backend
    pub fn with_backend(
        backend: IndexBackend,
        dimension: usize,
        capacity: usize,
        params: HnswParams,
    ) -> Self {
        match backend {
            IndexBackend::Exact => Self::exact(dimension),
            IndexBackend::Hnsw => Self::hnsw(dimension, capacity, params),
        }
    }

    /// Insert a vector into the index
    pub fn insert(&mut self, id: u64, vector: Vec<f32>) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        if self.positions.contains_key(&id) {
            return Err(VectorIndexError::DuplicateId(id));
        }

        let position = self.vectors.len();
        if let Backend::Hnsw { graph, .. } = &self.backend {
            // The graph stores positions; ids are mapped back on search
            graph.insert((vector.as_slice(), position));
        }

        self.positions.insert(id, position);
        self.vectors.push((id, vector));

        Ok(())
    }

    /// Search for the k most similar vectors
    ///
    /// Results are sorted by score descending, ties broken by id, and never
    /// exceed `min(k, len())`. Both backends report the same cosine score for
    /// the same vector; HNSW only narrows down which vectors get scored.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let score = |(id, vector): &(u64, Vec<f32>)| SearchResult {
            id: *id,
            score: cosine_similarity(query, vector),
        };

        let mut results: Vec<SearchResult> = match &self.backend {
            Backend::Exact => self.vectors.iter().map(score).collect(),
            Backend::Hnsw { graph, ef_search } => graph
                .search(query, k, (*ef_search).max(k))
                .into_iter()
                .filter_map(|neighbour| self.vectors.get(neighbour.d_id))
                .map(score)
                .collect(),
        };

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        results.truncate(k);

        Ok(results)
    }

    /// Get the number of vectors in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Get vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Which backend answers searches
    pub fn backend(&self) -> IndexBackend {
        match self.backend {
            Backend::Exact => IndexBackend::Exact,
            Backend::Hnsw { .. } => IndexBackend::Hnsw,
        }
    }
}
