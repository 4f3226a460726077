//! Error types for the `askbase-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// The query path reports the stage that failed: input validation errors are
/// raised before any external call, retrieval errors mean the generator was
/// never invoked, and generation errors mean retrieval had already succeeded.
/// Per-document ingestion problems are not surfaced through this type at all;
/// they are collected into
/// [`IngestionReport::failures`](crate::ingestion::IngestionReport).
#[derive(Debug, Error)]
pub enum RagError {
    /// The caller supplied an empty document or question, or a non-positive
    /// `top_k`. Rejected before any external call.
    #[error("Invalid input: {0}")]
    InvalidInputError(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Retrieval failed before generation was attempted.
    #[error("Retrieval error ({stage}): {message}")]
    RetrievalError {
        /// The retrieval stage that failed: `"embed"` or `"search"`.
        stage: String,
        /// A description of the failure.
        message: String,
    },

    /// The language-model call failed after retrieval had succeeded.
    #[error("Generation error ({model}): {message}")]
    GenerationError {
        /// The generator backend that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// An error occurred during result reranking.
    #[error("Reranker error ({reranker}): {message}")]
    RerankerError {
        /// The reranker that produced the error.
        reranker: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An ingestion source descriptor could not be used at all (missing
    /// file or directory, unparseable URL).
    #[error("Ingestion error ({descriptor}): {message}")]
    IngestionError {
        /// The source descriptor that could not be used.
        descriptor: String,
        /// A description of the failure.
        message: String,
    },

    /// An error propagated from `askbase-core`.
    #[error(transparent)]
    Core(#[from] askbase_core::AskError),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
