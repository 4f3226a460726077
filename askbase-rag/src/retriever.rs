//! Question-to-chunks retrieval.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::reranker::Reranker;
use crate::vectorstore::VectorStore;

/// Retrieves the chunks most similar to a question.
///
/// Validates the question locally, embeds it, queries the vector store for
/// the nearest chunks, applies the optional [`Reranker`], and filters by the
/// similarity threshold. Any embedder or store failure surfaces as
/// [`RagError::RetrievalError`] naming the stage that failed.
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    reranker: Option<Arc<dyn Reranker>>,
    collection: String,
    similarity_threshold: f32,
}

impl Retriever {
    /// Create a retriever bound to one collection.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        reranker: Option<Arc<dyn Reranker>>,
        collection: impl Into<String>,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            embedding_provider,
            vector_store,
            reranker,
            collection: collection.into(),
            similarity_threshold,
        }
    }

    /// Retrieve the `top_k` chunks most similar to `question`, most similar
    /// first.
    ///
    /// A `top_k` larger than the collection returns everything available;
    /// an empty collection yields an empty `Vec`, not an error. Equal scores
    /// keep the store's native order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInputError`] for an empty question or
    /// `top_k == 0`, raised before any external call, and
    /// [`RagError::RetrievalError`] when the embedder or the store fails.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidInputError("question must not be empty".to_string()));
        }
        if top_k == 0 {
            return Err(RagError::InvalidInputError("top_k must be at least 1".to_string()));
        }

        // 1. Embed the question
        let query_embedding = self.embedding_provider.embed(question).await.map_err(|e| {
            error!(error = %e, "question embedding failed");
            RagError::RetrievalError { stage: "embed".to_string(), message: e.to_string() }
        })?;

        // 2. Nearest-neighbor search
        let results = self
            .vector_store
            .search(&self.collection, &query_embedding, top_k)
            .await
            .map_err(|e| {
                error!(collection = %self.collection, error = %e, "vector store search failed");
                RagError::RetrievalError { stage: "search".to_string(), message: e.to_string() }
            })?;

        // 3. Rerank if a reranker is configured
        let results = if let Some(reranker) = &self.reranker {
            reranker.rerank(question, results).await.map_err(|e| {
                error!(error = %e, "reranking failed");
                RagError::RetrievalError { stage: "rerank".to_string(), message: e.to_string() }
            })?
        } else {
            results
        };

        // 4. Filter by similarity threshold
        let threshold = self.similarity_threshold;
        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), top_k, "retrieval completed");

        Ok(filtered)
    }
}
