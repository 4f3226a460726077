//! Document ingestion: sources → documents → chunks → embeddings → store.
//!
//! The [`Ingestor`] drives the ingestion half of the pipeline. A
//! [`DocumentSource`] describes where content comes from: raw text, a file,
//! a directory, or a URL (optionally crawling same-origin links). Each
//! resulting document is chunked, its chunks are embedded in batches, and the
//! chunks are stored under stable IDs (`{source_id}_{chunk_index}`) after the
//! document's previous chunks are deleted, so re-ingesting a document
//! replaces its content instead of duplicating it.
//!
//! One document's failure never aborts the rest of the call: per-document
//! errors are collected into [`IngestionReport::failures`] and processing
//! continues.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// File extensions picked up by directory ingestion.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "html", "htm"];

/// Pages whose cleaned text is shorter than this are skipped during crawls.
const MIN_PAGE_CHARS: usize = 50;

/// A description of content to ingest.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Raw text under a caller-chosen identifier.
    Text {
        /// Identifier stored as the document's `source_id`.
        source_id: String,
        /// The document content.
        text: String,
        /// Metadata attached to the document.
        metadata: HashMap<String, String>,
    },
    /// A single local file (`.txt`, `.md`, `.html`, `.htm`).
    File {
        /// Path to the file.
        path: PathBuf,
        /// Metadata attached to the document.
        metadata: HashMap<String, String>,
    },
    /// A directory, processed recursively; unsupported extensions are
    /// skipped.
    Directory {
        /// Path to the directory.
        path: PathBuf,
        /// Metadata attached to every document found.
        metadata: HashMap<String, String>,
    },
    /// A web page, optionally crawling links on the same origin.
    Url {
        /// The page URL.
        url: String,
        /// Whether to follow same-origin links breadth-first (bounded by the
        /// configured page budget).
        follow_links: bool,
        /// Metadata attached to every page ingested.
        metadata: HashMap<String, String>,
    },
}

impl DocumentSource {
    /// Raw text with empty metadata.
    pub fn text(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text { source_id: source_id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// A single file with empty metadata.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into(), metadata: HashMap::new() }
    }

    /// A directory with empty metadata.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory { path: path.into(), metadata: HashMap::new() }
    }

    /// A URL with empty metadata.
    pub fn url(url: impl Into<String>, follow_links: bool) -> Self {
        Self::Url { url: url.into(), follow_links, metadata: HashMap::new() }
    }
}

/// One document (or page, or file) that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionFailure {
    /// The source identifier of the failed document.
    pub source: String,
    /// A description of what went wrong.
    pub error: String,
}

/// The outcome of an ingestion call.
///
/// Failures do not abort the call: a report with a non-empty `failures` list
/// is still returned through `Ok`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Number of documents successfully chunked, embedded, and stored.
    pub documents_processed: usize,
    /// Total number of chunks stored across all processed documents.
    pub chunks_created: usize,
    /// Per-document failures, in processing order.
    pub failures: Vec<IngestionFailure>,
}

impl IngestionReport {
    /// `true` when every document was ingested successfully.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives documents through chunking, embedding, and storage.
pub struct Ingestor {
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
    embed_batch_size: usize,
    max_pages: usize,
    http: reqwest::Client,
}

impl Ingestor {
    /// Create an ingestor bound to the collection named in `config`.
    pub fn new(
        chunker: Arc<dyn Chunker>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        config: &RagConfig,
    ) -> Self {
        Self {
            chunker,
            embedding_provider,
            vector_store,
            collection: config.collection.clone(),
            embed_batch_size: config.embed_batch_size,
            max_pages: config.max_pages,
            http: reqwest::Client::new(),
        }
    }

    /// Ingest everything a source descriptor expands to.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] only when the descriptor itself
    /// is unusable (missing file or directory, unparseable URL). Everything
    /// past that point is reported per-document in the returned
    /// [`IngestionReport`].
    pub async fn ingest(&self, source: DocumentSource) -> Result<IngestionReport> {
        match source {
            DocumentSource::Text { source_id, text, metadata } => {
                let document = Document { source_id, text, metadata: stamp(metadata, "text") };
                self.ingest_documents(&[document]).await
            }
            DocumentSource::File { path, metadata } => {
                let text = read_file(&path).await?;
                let mut metadata = stamp(metadata, "file");
                if let Some(name) = path.file_name() {
                    metadata.insert("filename".to_string(), name.to_string_lossy().into_owned());
                }
                let document = Document { source_id: path.display().to_string(), text, metadata };
                self.ingest_documents(&[document]).await
            }
            DocumentSource::Directory { path, metadata } => {
                let (documents, mut failures) = collect_directory(&path, &metadata).await?;
                let mut report = self.ingest_documents(&documents).await?;
                report.failures.append(&mut failures);
                Ok(report)
            }
            DocumentSource::Url { url, follow_links, metadata } => {
                let (documents, mut failures) = self.crawl(&url, follow_links, &metadata).await?;
                let mut report = self.ingest_documents(&documents).await?;
                report.failures.append(&mut failures);
                Ok(report)
            }
        }
    }

    /// Ingest already-constructed documents, one at a time.
    ///
    /// Documents are processed sequentially, which also serializes writes
    /// for repeated `source_id`s within one call (last writer wins).
    pub async fn ingest_documents(&self, documents: &[Document]) -> Result<IngestionReport> {
        let mut report = IngestionReport::default();

        for document in documents {
            match self.ingest_document(document).await {
                Ok(chunk_count) => {
                    report.documents_processed += 1;
                    report.chunks_created += chunk_count;
                }
                Err(e) => {
                    warn!(document.id = %document.source_id, error = %e, "document ingestion failed");
                    report.failures.push(IngestionFailure {
                        source: document.source_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            documents = report.documents_processed,
            chunks = report.chunks_created,
            failures = report.failures.len(),
            "ingestion completed"
        );

        Ok(report)
    }

    /// Chunk, embed, and store a single document. Returns the chunk count.
    async fn ingest_document(&self, document: &Document) -> Result<usize> {
        if document.text.trim().is_empty() {
            return Err(RagError::InvalidInputError(format!(
                "document '{}' has no content",
                document.source_id
            )));
        }

        // 1. Chunk the document
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.source_id, chunk_count = 0, "ingested document (empty)");
            return Ok(0);
        }

        // 2. Generate embeddings in batches
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embed_batch_size) {
            embeddings.extend(self.embedding_provider.embed_batch(batch).await?);
        }

        // 3. Attach embeddings to chunks
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        // 4. Replace the document's previous chunks, then store the new ones.
        // The delete drops stale chunks when the new version has fewer.
        self.vector_store.delete_document(&self.collection, &document.source_id).await?;
        self.vector_store.upsert(&self.collection, &chunks).await?;

        let chunk_count = chunks.len();
        info!(document.id = %document.source_id, chunk_count, "ingested document");

        Ok(chunk_count)
    }

    /// Fetch a page (and optionally its same-origin links, breadth-first)
    /// into documents. Fetch failures become per-page failure entries.
    async fn crawl(
        &self,
        start: &str,
        follow_links: bool,
        base_metadata: &HashMap<String, String>,
    ) -> Result<(Vec<Document>, Vec<IngestionFailure>)> {
        let start_url = Url::parse(start).map_err(|e| RagError::IngestionError {
            descriptor: start.to_string(),
            message: format!("invalid URL: {e}"),
        })?;

        let mut queue = VecDeque::from([start_url]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut documents = Vec::new();
        let mut failures = Vec::new();

        while let Some(mut url) = queue.pop_front() {
            if documents.len() >= self.max_pages {
                break;
            }
            url.set_fragment(None);
            if !visited.insert(url.to_string()) {
                continue;
            }

            let html = match self.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %url, error = %e, "page fetch failed");
                    failures
                        .push(IngestionFailure { source: url.to_string(), error: e.to_string() });
                    continue;
                }
            };

            let text = html_to_text(&html);
            if text.len() < MIN_PAGE_CHARS {
                debug!(url = %url, length = text.len(), "skipping page with too little content");
            } else {
                let mut metadata = stamp(base_metadata.clone(), "webpage");
                if let Some(title) = html_title(&html) {
                    metadata.insert("title".to_string(), title);
                }
                documents.push(Document { source_id: url.to_string(), text, metadata });
            }

            if follow_links {
                for link in extract_links(&html, &url) {
                    if !visited.contains(link.as_str()) {
                        queue.push_back(link);
                    }
                }
            }
        }

        info!(
            documents = documents.len(),
            pages_visited = visited.len(),
            "crawl completed"
        );

        Ok((documents, failures))
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            RagError::IngestionError { descriptor: url.to_string(), message: e.to_string() }
        })?;
        if !response.status().is_success() {
            return Err(RagError::IngestionError {
                descriptor: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }
        response.text().await.map_err(|e| RagError::IngestionError {
            descriptor: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Stamp provenance metadata shared by every ingestion source. Caller-given
/// values win over stamped ones.
fn stamp(mut metadata: HashMap<String, String>, kind: &str) -> HashMap<String, String> {
    metadata.entry("type".to_string()).or_insert_with(|| kind.to_string());
    metadata.entry("ingested_at".to_string()).or_insert_with(|| Utc::now().to_rfc3339());
    metadata
}

/// Read a file as text; HTML files are reduced to their text content.
async fn read_file(path: &Path) -> Result<String> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| RagError::IngestionError {
        descriptor: path.display().to_string(),
        message: e.to_string(),
    })?;

    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    Ok(if is_html { html_to_text(&raw) } else { raw })
}

/// Recursively collect supported files under a directory into documents.
/// Unreadable files become failure entries.
async fn collect_directory(
    path: &Path,
    base_metadata: &HashMap<String, String>,
) -> Result<(Vec<Document>, Vec<IngestionFailure>)> {
    if !path.is_dir() {
        return Err(RagError::IngestionError {
            descriptor: path.display().to_string(),
            message: "directory not found".to_string(),
        });
    }

    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_path = entry.path();
        let supported = file_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !supported {
            continue;
        }

        match read_file(file_path).await {
            Ok(text) => {
                let mut metadata = stamp(base_metadata.clone(), "file");
                metadata.insert(
                    "filename".to_string(),
                    entry.file_name().to_string_lossy().into_owned(),
                );
                documents.push(Document {
                    source_id: file_path.display().to_string(),
                    text,
                    metadata,
                });
            }
            Err(e) => {
                failures.push(IngestionFailure {
                    source: file_path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((documents, failures))
}

// ── HTML cleaning ──────────────────────────────────────────────────

static NON_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<nav\b.*?</nav>|<footer\b.*?</footer>|<header\b.*?</header>",
    )
    .expect("hard-coded regex")
});

static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(p|div|li|tr|h[1-6]|blockquote)>|<br\s*/?>").expect("hard-coded regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("hard-coded regex"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("hard-coded regex"));

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("hard-coded regex"));

/// Reduce an HTML page to its text: drop scripts, styles, and chrome
/// elements, turn block-element ends into line breaks, strip the remaining
/// tags, decode common entities, and collapse blank lines.
fn html_to_text(html: &str) -> String {
    let without_chrome = NON_CONTENT_RE.replace_all(html, "");
    let with_breaks = BLOCK_END_RE.replace_all(&without_chrome, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the page title, if any.
fn html_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .filter(|t| !t.is_empty())
}

/// Extract same-origin links from a page, resolved against its URL and with
/// fragments stripped.
fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for capture in HREF_RE.captures_iter(html) {
        let Ok(mut url) = base.join(&capture[1]) else {
            continue;
        };
        url.set_fragment(None);
        let same_origin = url.scheme() == base.scheme()
            && url.host() == base.host()
            && url.port() == base.port();
        if !same_origin || !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if seen.insert(url.to_string()) {
            links.push(url);
        }
    }

    links
}

/// Decode the handful of HTML entities that matter for plain-text content.
/// `&amp;` is decoded last so entity-escaped text is not decoded twice.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
