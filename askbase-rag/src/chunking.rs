//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and three implementations:
//!
//! - [`RecursiveChunker`] — splits at structural boundaries (paragraphs,
//!   sentences, lines, words) with configurable overlap; the default
//! - [`FixedSizeChunker`] — splits by character count with configurable overlap
//! - [`MarkdownChunker`] — splits by markdown headers, preserving header context
//!
//! Chunking is pure and deterministic: the same document and configuration
//! always produce the same chunks. Every chunk produced by
//! [`RecursiveChunker`] and [`FixedSizeChunker`] is an exact substring of the
//! source document, and its byte offset is recorded in the `offset` metadata
//! field, so the original text can be reassembled from the chunks.

use crate::document::{Chunk, Document};

/// Structural boundaries tried in order, largest first: paragraph breaks,
/// sentence endings, line breaks, then word boundaries.
const SEPARATORS: &[&str] = &["\n\n", ". ", "! ", "? ", "\n", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached later by the ingestion pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text at structural boundaries with configurable overlap.
///
/// Splits happen at the largest boundary that keeps segments within
/// `chunk_size`: paragraph breaks first, then sentence endings, line breaks,
/// word boundaries, and finally a hard character cut. Segments keep their
/// trailing separators, so every chunk is an exact substring of the document.
/// Each chunk after the first starts with the trailing segments of the
/// previous chunk, up to `chunk_overlap` characters, to preserve context at
/// boundaries; the overlap shrinks (down to zero) when it would push a chunk
/// past `chunk_size`.
///
/// # Example
///
/// ```rust,ignore
/// use askbase_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        let spans = split_with_overlap(text, self.chunk_size, self.chunk_overlap);

        spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                metadata.insert("offset".to_string(), start.to_string());
                Chunk {
                    id: format!("{}_{i}", document.source_id),
                    text: text[start..end].to_string(),
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.source_id.clone(),
                }
            })
            .collect()
    }
}

/// Split text into chunk spans: segment at structural boundaries, then pack
/// segments into chunks of at most `chunk_size` characters with overlap.
fn split_with_overlap(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, usize)> {
    let segments = split_structural(text, chunk_size, SEPARATORS);
    pack_spans(&segment_spans(&segments), chunk_size, chunk_overlap)
}

/// Split text into segments no longer than `max_len`, preferring the
/// earliest (largest) separator that produces a split. Segments keep their
/// trailing separator, so concatenating them reproduces the input exactly.
fn split_structural<'a>(text: &'a str, max_len: usize, separators: &[&str]) -> Vec<&'a str> {
    if text.len() <= max_len {
        return vec![text];
    }
    let Some((separator, rest)) = separators.split_first() else {
        return hard_cut(text, max_len);
    };

    let pieces = split_keeping_separator(text, separator);
    if pieces.len() <= 1 {
        // Separator absent; fall through to the next level.
        return split_structural(text, max_len, rest);
    }

    let mut segments = Vec::new();
    for piece in pieces {
        if piece.len() <= max_len {
            segments.push(piece);
        } else {
            segments.extend(split_structural(piece, max_len, rest));
        }
    }
    segments
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Cut text into pieces of at most `max_len` bytes at character boundaries.
///
/// A single character wider than `max_len` is emitted whole.
fn hard_cut(text: &str, max_len: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = floor_char_boundary(text, (start + max_len).min(text.len()));
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }
        pieces.push(&text[start..end]);
        start = end;
    }
    pieces
}

/// Byte spans of contiguous segments that concatenate to the source text.
fn segment_spans(segments: &[&str]) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(segments.len());
    let mut offset = 0;
    for segment in segments {
        spans.push((offset, offset + segment.len()));
        offset += segment.len();
    }
    spans
}

/// Pack contiguous segment spans into chunk spans of at most `chunk_size`
/// characters. Each chunk after the first is re-seeded with the trailing
/// segments of the previous chunk, totalling at most `chunk_overlap`
/// characters; the overlap is dropped when keeping it would push the chunk
/// past `chunk_size`.
fn pack_spans(
    segment_spans: &[(usize, usize)],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<(usize, usize)> {
    let Some(&(first_start, _)) = segment_spans.first() else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    // Start offsets of the segments inside the current chunk; candidates for
    // the next chunk's overlap boundary.
    let mut boundaries: Vec<usize> = Vec::new();
    let mut start = first_start;
    let mut end = first_start;

    for &(seg_start, seg_end) in segment_spans {
        if end > start && seg_end - start > chunk_size {
            spans.push((start, end));
            let mut overlap_start = seg_start;
            for &b in &boundaries {
                if b > start && end - b <= chunk_overlap && seg_end - b <= chunk_size {
                    overlap_start = b;
                    break;
                }
            }
            start = overlap_start;
            boundaries.retain(|&b| b > start);
        }
        boundaries.push(seg_start);
        end = seg_end;
    }

    if end > start {
        spans.push((start, end));
    }
    spans
}

/// Largest index `<= index` that lies on a character boundary.
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest index `>= index` that lies on a character boundary.
fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Splits text into fixed-size chunks by character count with configurable
/// overlap.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus `chunk_index` and `offset`
/// fields. Cut points are aligned to character boundaries.
///
/// # Example
///
/// ```rust,ignore
/// use askbase_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(256, 50);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < text.len() {
            let mut end = floor_char_boundary(text, (start + self.chunk_size).min(text.len()));
            if end <= start {
                end = ceil_char_boundary(text, start + 1);
            }

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());
            metadata.insert("offset".to_string(), start.to_string());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.source_id),
                text: text[start..end].to_string(),
                embedding: Vec::new(),
                metadata,
                document_id: document.source_id.clone(),
            });

            chunk_index += 1;
            if end == text.len() {
                break;
            }
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start = ceil_char_boundary(text, start + step);
        }

        chunks
    }
}

/// Splits text by markdown headers, keeping each section as a chunk.
///
/// Each section is prefixed with its header hierarchy. Sections exceeding
/// `chunk_size` are further split at structural boundaries with overlap.
/// The `header_path` metadata field records the header hierarchy for each
/// chunk. Header-prefixed chunks are not substrings of the source document,
/// so no `offset` field is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use askbase_rag::MarkdownChunker;
///
/// let chunker = MarkdownChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl MarkdownChunker {
    /// Create a new `MarkdownChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// A markdown section with its header hierarchy and body text.
struct MarkdownSection {
    header_path: String,
    text: String,
}

/// Parse markdown text into sections split by headers.
fn parse_markdown_sections(text: &str) -> Vec<MarkdownSection> {
    let mut sections = Vec::new();
    let mut headers: Vec<String> = Vec::new();
    let mut current_body = String::new();
    let mut current_header_path = String::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            // Save previous section
            if !current_body.is_empty() || !current_header_path.is_empty() {
                sections.push(MarkdownSection {
                    header_path: current_header_path.clone(),
                    text: current_body.trim().to_string(),
                });
                current_body = String::new();
            }

            // Determine header level
            let level = trimmed.chars().take_while(|c| *c == '#').count();
            let header_text = trimmed[level..].trim().to_string();

            // Update header stack
            headers.truncate(level.saturating_sub(1));
            headers.push(header_text);
            current_header_path = headers.join(" > ");
        } else {
            if !current_body.is_empty() {
                current_body.push('\n');
            }
            current_body.push_str(line);
        }
    }

    // Save final section
    if !current_body.is_empty() || !current_header_path.is_empty() {
        sections.push(MarkdownSection {
            header_path: current_header_path,
            text: current_body.trim().to_string(),
        });
    }

    sections
}

impl Chunker for MarkdownChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let sections = parse_markdown_sections(&document.text);
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for section in sections {
            // Build section text with header prefix
            let section_text = if section.header_path.is_empty() {
                section.text.clone()
            } else if section.text.is_empty() {
                section.header_path.clone()
            } else {
                format!("{}\n{}", section.header_path, section.text)
            };

            if section_text.is_empty() {
                continue;
            }

            let sub_chunks: Vec<String> = if section_text.len() > self.chunk_size {
                split_with_overlap(&section_text, self.chunk_size, self.chunk_overlap)
                    .into_iter()
                    .map(|(start, end)| section_text[start..end].to_string())
                    .collect()
            } else {
                vec![section_text]
            };

            for text in sub_chunks {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), chunk_index.to_string());
                metadata.insert("header_path".to_string(), section.header_path.clone());

                chunks.push(Chunk {
                    id: format!("{}_{chunk_index}", document.source_id),
                    text,
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.source_id.clone(),
                });
                chunk_index += 1;
            }
        }

        chunks
    }
}
