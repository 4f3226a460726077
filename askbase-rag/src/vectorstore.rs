//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`Chunk`]s and support
/// upserting, deleting, and searching by vector similarity. The store is the
/// system of record for chunks: the pipeline discards them from working
/// memory once stored. The similarity metric is the backend's choice and
/// must match the metric the embedding provider was trained for.
///
/// Concurrent searches against one collection must be safe; writes for a
/// single document are issued by the ingestion pipeline as a delete followed
/// by an upsert within one sequential pass.
///
/// # Example
///
/// ```rust,ignore
/// use askbase_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs", 384).await?;
/// store.upsert("docs", &chunks).await?;
/// let results = store.search("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert chunks into a collection. Chunks must have embeddings set.
    ///
    /// A chunk whose ID already exists replaces the stored one.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Delete chunks by their IDs from a collection.
    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()>;

    /// Delete every chunk belonging to the given document.
    ///
    /// Used on re-ingestion so that a shrinking document leaves no stale
    /// chunks behind.
    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score; fewer than
    /// `top_k` when the collection holds fewer chunks, and an empty `Vec`
    /// (not an error) when it holds none.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of chunks stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}
