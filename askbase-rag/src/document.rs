//! Data types for documents, chunks, search results, citations, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in a citation snippet.
const SNIPPET_MAX_CHARS: usize = 500;

/// A source document containing text content and metadata.
///
/// `source_id` identifies where the content came from (a path, a URL, or any
/// caller-chosen identifier) and is the key under which the document's chunks
/// are stored. Documents are immutable once chunked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier of the original source (URL, path, or logical name).
    pub source_id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// Attach metadata to the document.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A segment of a [`Document`] with its vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{chunk_index}`. Stable across
    /// re-ingestions of the same document so upserts replace prior chunks.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until the
    /// ingestion pipeline attaches one.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus chunk-specific
    /// fields (`chunk_index`, and `offset` for substring chunkers).
    pub metadata: HashMap<String, String>,
    /// The `source_id` of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// Returned transiently by retrieval; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A reference back to a source document that contributed context to an
/// answer.
///
/// Citations are derived at answer-assembly time from retrieval results:
/// one per unique source document, in order of first appearance (which is
/// also highest-relevance-first, since results arrive ranked).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// The `source_id` of the cited document.
    pub source_id: String,
    /// A preview of the most relevant chunk from this source, truncated to
    /// 500 characters.
    pub snippet: String,
    /// The similarity score of the most relevant chunk from this source.
    pub score: f32,
    /// Metadata of the cited chunk (title, filename, ingestion time, ...).
    pub metadata: HashMap<String, String>,
}

impl Citation {
    /// Build the citation list for a ranked sequence of search results.
    ///
    /// Results are assumed ordered most-relevant-first; the first result
    /// seen for each source document supplies its snippet and score.
    pub fn from_results(results: &[SearchResult]) -> Vec<Citation> {
        let mut citations: Vec<Citation> = Vec::new();
        for result in results {
            if citations.iter().any(|c| c.source_id == result.chunk.document_id) {
                continue;
            }
            citations.push(Citation {
                source_id: result.chunk.document_id.clone(),
                snippet: snippet_of(&result.chunk.text),
                score: result.score,
                metadata: result.chunk.metadata.clone(),
            });
        }
        citations
    }
}

/// Truncate chunk text to a citation snippet, marking elided content.
fn snippet_of(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{truncated}...")
}

/// A generated answer with its supporting citations.
///
/// Ephemeral: produced per query and never persisted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// Citations for the sources that grounded the answer, ordered by first
    /// appearance in the retrieved context. Empty when the caller opted out
    /// of source tracking or nothing was retrieved.
    pub citations: Vec<Citation>,
    /// Wall-clock duration of the whole query in milliseconds.
    pub elapsed_ms: u64,
}
