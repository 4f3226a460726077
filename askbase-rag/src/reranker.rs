//! Reranker trait for re-scoring retrieval results.
//!
//! Re-ranking and deduplication beyond raw nearest-neighbor order are an
//! optional extension point: the pipeline applies a [`Reranker`] only when
//! one is configured, and none is by default.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// A reranker that re-scores and reorders retrieval results.
///
/// Implementations can use cross-encoder models, LLM-based scoring,
/// per-document deduplication, or other strategies to improve precision
/// beyond initial vector similarity.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank results given the original question.
    ///
    /// Returns results in a new order with potentially updated scores.
    async fn rerank(&self, question: &str, results: Vec<SearchResult>)
    -> Result<Vec<SearchResult>>;
}

/// A no-op reranker that returns results unchanged.
///
/// Useful as a default when no reranking is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReranker;

#[async_trait]
impl Reranker for NoOpReranker {
    async fn rerank(
        &self,
        _question: &str,
        results: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>> {
        Ok(results)
    }
}
