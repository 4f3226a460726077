//! Ingestion tests: source descriptors, metadata stamping, partial-failure
//! reporting, and idempotent re-ingestion.

mod common;

use std::fs;
use std::sync::Arc;

use askbase_model::MockGenerator;
use askbase_rag::{
    Document, DocumentSource, InMemoryVectorStore, RagConfig, RagError, RagPipeline,
    RecursiveChunker,
};

use common::{FailingEmbedder, build_pipeline};

#[tokio::test]
async fn text_source_is_chunked_and_stored() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;

    let report = pipeline
        .ingest(DocumentSource::text("policy.md", "PTO requests need 2 weeks notice."))
        .await
        .unwrap();

    assert_eq!(report.documents_processed, 1);
    assert_eq!(report.chunks_created, 1);
    assert!(report.is_complete());
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 1);

    // Provenance metadata is stamped onto the stored chunks.
    let results = pipeline.retrieve("PTO notice", Some(1)).await.unwrap();
    let metadata = &results[0].chunk.metadata;
    assert_eq!(metadata.get("type").map(String::as_str), Some("text"));
    assert!(metadata.contains_key("ingested_at"));
    assert!(metadata.contains_key("chunk_index"));
}

#[tokio::test]
async fn empty_document_is_a_recorded_failure_not_an_error() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;

    let report = pipeline.ingest(DocumentSource::text("empty.md", "   \n ")).await.unwrap();

    assert_eq!(report.documents_processed, 0);
    assert_eq!(report.chunks_created, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "empty.md");
    assert!(report.failures[0].error.contains("no content"));
}

#[tokio::test]
async fn one_bad_document_does_not_abort_the_batch() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;

    let documents = vec![
        Document::new("good.md", "Offices open at 9am."),
        Document::new("bad.md", ""),
        Document::new("also-good.md", "Badges come from facilities."),
    ];
    let report = pipeline.ingest_documents(&documents).await.unwrap();

    assert_eq!(report.documents_processed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "bad.md");
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 2);
}

#[tokio::test]
async fn embedding_failure_is_reported_per_document() {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(FailingEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(Arc::new(MockGenerator::new("ok")))
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();

    let report =
        pipeline.ingest(DocumentSource::text("policy.md", "Some content.")).await.unwrap();

    assert_eq!(report.documents_processed, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("connection refused"));
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 0);
}

#[tokio::test]
async fn file_source_reads_and_stamps_filename() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.md");
    fs::write(&path, "PTO requests need 2 weeks notice.").unwrap();

    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    let report = pipeline.ingest(DocumentSource::file(&path)).await.unwrap();

    assert_eq!(report.documents_processed, 1);
    assert!(report.is_complete());

    let results = pipeline.retrieve("PTO notice", Some(1)).await.unwrap();
    assert_eq!(results[0].chunk.document_id, path.display().to_string());
    let metadata = &results[0].chunk.metadata;
    assert_eq!(metadata.get("filename").map(String::as_str), Some("policy.md"));
    assert_eq!(metadata.get("type").map(String::as_str), Some("file"));
}

#[tokio::test]
async fn missing_file_is_a_descriptor_error() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    let err =
        pipeline.ingest(DocumentSource::file("/no/such/file.md")).await.unwrap_err();
    assert!(matches!(err, RagError::IngestionError { .. }));
}

#[tokio::test]
async fn directory_source_recurses_and_skips_unsupported_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "Document about benefits enrollment.").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/b.txt"), "Document about expense reports.").unwrap();
    fs::write(dir.path().join("ignored.rs"), "fn main() {}").unwrap();

    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    let report = pipeline.ingest(DocumentSource::directory(dir.path())).await.unwrap();

    assert_eq!(report.documents_processed, 2);
    assert!(report.is_complete());
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 2);
}

#[tokio::test]
async fn missing_directory_is_a_descriptor_error() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    let err =
        pipeline.ingest(DocumentSource::directory("/no/such/dir")).await.unwrap_err();
    assert!(matches!(err, RagError::IngestionError { .. }));
}

#[tokio::test]
async fn html_file_is_reduced_to_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    fs::write(
        &path,
        "<html><head><title>Policies</title><script>alert(1)</script></head>\
         <body><p>PTO requests need 2 weeks notice.</p>\
         <p>Remote work requires manager approval.</p></body></html>",
    )
    .unwrap();

    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    pipeline.ingest(DocumentSource::file(&path)).await.unwrap();

    let results = pipeline.retrieve("PTO notice", Some(1)).await.unwrap();
    let text = &results[0].chunk.text;
    assert!(text.contains("PTO requests need 2 weeks notice."));
    assert!(!text.contains('<'));
    assert!(!text.contains("alert"));
}

#[tokio::test]
async fn reingesting_a_file_does_not_grow_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.md");
    fs::write(&path, "PTO requests need 2 weeks notice.").unwrap();

    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    pipeline.ingest(DocumentSource::file(&path)).await.unwrap();
    let count = pipeline.stats().await.unwrap().chunk_count;

    pipeline.ingest(DocumentSource::file(&path)).await.unwrap();
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, count);
}

#[tokio::test]
async fn unparseable_url_is_a_descriptor_error() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    let err =
        pipeline.ingest(DocumentSource::url("not a url", false)).await.unwrap_err();
    match err {
        RagError::IngestionError { descriptor: source, message } => {
            assert_eq!(source, "not a url");
            assert!(message.contains("invalid URL"));
        }
        other => panic!("expected IngestionError, got {other}"),
    }
}
