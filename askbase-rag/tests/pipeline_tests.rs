//! End-to-end pipeline tests: ingest-then-answer scenarios, streaming
//! behavior, and failure isolation between retrieval and generation.

mod common;

use std::sync::Arc;

use futures::StreamExt;

use askbase_core::Generator;
use askbase_model::MockGenerator;
use askbase_rag::{
    AnswerEvent, DocumentSource, InMemoryVectorStore, NoOpReranker, QueryOptions, RagConfig,
    RagError, RagPipeline, RecursiveChunker,
};

use common::{FailingEmbedder, FailingGenerator, HashEmbedder, MidStreamFailGenerator, build_pipeline};

const POLICY_TEXT: &str =
    "Remote work requires manager approval. PTO requests need 2 weeks notice.";

#[tokio::test]
async fn single_document_query_cites_its_source() {
    let pipeline = build_pipeline(
        "PTO requests need 2 weeks notice [policy.md].",
        RagConfig::default(),
    )
    .await;

    let report = pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();
    assert_eq!(report.documents_processed, 1);
    assert!(report.chunks_created >= 1);
    assert!(report.is_complete());

    let results = pipeline.retrieve("How much notice is needed for PTO?", Some(1)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.document_id, "policy.md");

    let options = QueryOptions { top_k: Some(1), include_sources: true };
    let answer = pipeline.answer("How much notice is needed for PTO?", &options).await.unwrap();
    assert_eq!(answer.text, "PTO requests need 2 weeks notice [policy.md].");
    assert_eq!(answer.citations.len(), 1);
    assert_eq!(answer.citations[0].source_id, "policy.md");
    assert!(answer.citations[0].snippet.contains("2 weeks notice"));
}

#[tokio::test]
async fn empty_index_answers_with_no_information_prompt() {
    let generator = Arc::new(MockGenerator::new(
        "No relevant information was found in the knowledge base.",
    ));
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(HashEmbedder::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(generator.clone())
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();

    // Retrieval on an empty index yields nothing, not an error.
    let results = pipeline.retrieve("anything at all?", None).await.unwrap();
    assert!(results.is_empty());

    let answer = pipeline.answer("anything at all?", &QueryOptions::default()).await.unwrap();
    assert!(answer.text.contains("No relevant information was found"));
    assert!(answer.citations.is_empty());

    // The generator was still invoked, with an explicit no-context prompt.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("No relevant information was found"));
    assert!(prompts[0].contains("anything at all?"));
}

#[tokio::test]
async fn reingesting_a_source_replaces_its_chunks() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;

    pipeline
        .ingest(DocumentSource::text("handbook.md", "The old handbook says offices open at 9am."))
        .await
        .unwrap();
    let first_count = pipeline.stats().await.unwrap().chunk_count;

    // Same content again: the chunk count must not grow.
    pipeline
        .ingest(DocumentSource::text("handbook.md", "The old handbook says offices open at 9am."))
        .await
        .unwrap();
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, first_count);

    // New content under the same source: only the new content is retrievable.
    pipeline
        .ingest(DocumentSource::text("handbook.md", "The new handbook says offices open at 8am."))
        .await
        .unwrap();

    let results = pipeline.retrieve("When do offices open?", Some(10)).await.unwrap();
    assert!(!results.is_empty());
    for result in &results {
        assert!(result.chunk.text.contains("new handbook"));
        assert!(!result.chunk.text.contains("old handbook"));
    }
}

#[tokio::test]
async fn shrinking_document_leaves_no_stale_chunks() {
    let config = RagConfig::builder().chunk_size(80).chunk_overlap(10).build().unwrap();
    let pipeline = build_pipeline("ok", config).await;

    let long_text = "First paragraph about benefits.\n\n\
                     Second paragraph about expenses.\n\n\
                     Third paragraph about travel.\n\n\
                     Fourth paragraph about equipment.";
    pipeline.ingest(DocumentSource::text("guide.md", long_text)).await.unwrap();
    let long_count = pipeline.stats().await.unwrap().chunk_count;
    assert!(long_count > 1);

    pipeline.ingest(DocumentSource::text("guide.md", "One short paragraph.")).await.unwrap();
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 1);
}

#[tokio::test]
async fn streaming_matches_blocking_and_ends_with_sources() {
    let pipeline = build_pipeline(
        "Remote work needs manager approval, see [policy.md].",
        RagConfig::default(),
    )
    .await;
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();

    let question = "Who approves remote work?";
    let blocking = pipeline.answer(question, &QueryOptions::default()).await.unwrap();

    let mut stream = pipeline.answer_stream(question, &QueryOptions::default()).await.unwrap();
    let mut streamed_text = String::new();
    let mut sources: Option<Vec<_>> = None;

    while let Some(event) = stream.next().await {
        match event.unwrap() {
            AnswerEvent::Delta(delta) => {
                // Deltas must all arrive before the terminal citation list.
                assert!(sources.is_none(), "delta after sources event");
                streamed_text.push_str(&delta);
            }
            AnswerEvent::Sources(citations) => {
                assert!(sources.is_none(), "more than one sources event");
                sources = Some(citations);
            }
        }
    }

    assert_eq!(streamed_text, blocking.text);
    let sources = sources.expect("stream ended without a sources event");
    assert_eq!(sources.len(), blocking.citations.len());
    assert_eq!(sources[0].source_id, "policy.md");
}

#[tokio::test]
async fn retrieval_failure_never_invokes_the_generator() {
    let generator = Arc::new(MockGenerator::new("should never be produced"));
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(FailingEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(generator.clone())
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();

    let err = pipeline.answer("question?", &QueryOptions::default()).await.unwrap_err();
    match err {
        RagError::RetrievalError { stage, .. } => assert_eq!(stage, "embed"),
        other => panic!("expected RetrievalError, got {other}"),
    }
    assert!(generator.prompts().is_empty(), "generator was invoked after retrieval failed");

    // Streaming mode fails the call itself, before any stream exists.
    let err = pipeline.answer_stream("question?", &QueryOptions::default()).await.err().unwrap();
    assert!(matches!(err, RagError::RetrievalError { .. }));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn generation_failure_surfaces_after_successful_retrieval() {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(HashEmbedder::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(Arc::new(FailingGenerator))
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();

    let err = pipeline.answer("How much notice?", &QueryOptions::default()).await.unwrap_err();
    assert!(matches!(err, RagError::GenerationError { .. }));
}

#[tokio::test]
async fn mid_stream_failure_ends_stream_with_error_and_no_sources() {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(HashEmbedder::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(Arc::new(MidStreamFailGenerator))
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();

    let mut stream = pipeline.answer_stream("notice?", &QueryOptions::default()).await.unwrap();
    let mut deltas = Vec::new();
    let mut saw_error = false;

    while let Some(event) = stream.next().await {
        match event {
            Ok(AnswerEvent::Delta(delta)) => deltas.push(delta),
            Ok(AnswerEvent::Sources(_)) => panic!("sources emitted after a failed stream"),
            Err(e) => {
                assert!(matches!(e, RagError::GenerationError { .. }));
                saw_error = true;
                break;
            }
        }
    }

    // Already-emitted increments are not retracted; the stream ends with an
    // explicit error marker instead of a citation list.
    assert_eq!(deltas, vec!["partial ".to_string(), "answer".to_string()]);
    assert!(saw_error);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn include_sources_false_skips_citations_only() {
    let pipeline = build_pipeline("the answer", RagConfig::default()).await;
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();

    let with_sources = pipeline
        .answer("notice?", &QueryOptions { top_k: None, include_sources: true })
        .await
        .unwrap();
    let without_sources = pipeline
        .answer("notice?", &QueryOptions { top_k: None, include_sources: false })
        .await
        .unwrap();

    assert_eq!(with_sources.text, without_sources.text);
    assert!(!with_sources.citations.is_empty());
    assert!(without_sources.citations.is_empty());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_external_call() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(FailingEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(generator.clone())
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();

    // The embedder would fail if it were reached; InvalidInputError proves
    // validation happens first.
    let err = pipeline.answer("   ", &QueryOptions::default()).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidInputError(_)));

    let err = pipeline
        .answer("question?", &QueryOptions { top_k: Some(0), include_sources: true })
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::InvalidInputError(_)));

    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn top_k_bounds_and_ordering() {
    let config = RagConfig::builder().chunk_size(60).chunk_overlap(0).build().unwrap();
    let pipeline = build_pipeline("ok", config).await;

    let text = "Benefits enrollment opens in November.\n\n\
                Expense reports are due monthly.\n\n\
                Travel must be booked through the portal.\n\n\
                Equipment requests go through IT.\n\n\
                Parking passes are issued by facilities.\n\n\
                Training budgets renew each January.";
    pipeline.ingest(DocumentSource::text("handbook.md", text)).await.unwrap();
    let total = pipeline.stats().await.unwrap().chunk_count;
    assert!(total > 5);

    let results = pipeline.retrieve("when are expense reports due?", Some(5)).await.unwrap();
    assert!(results.len() <= 5);
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }

    // top_k larger than the index returns everything without erroring.
    let all = pipeline.retrieve("when are expense reports due?", Some(total + 100)).await.unwrap();
    assert_eq!(all.len(), total);
}

#[tokio::test]
async fn builder_requires_every_component() {
    let err = RagPipeline::builder().config(RagConfig::default()).build().err().unwrap();
    assert!(matches!(err, RagError::ConfigError(_)));

    let err = RagPipeline::builder()
        .embedding_provider(Arc::new(HashEmbedder::new(8)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(Arc::new(MockGenerator::new("x")))
        .build()
        .err().unwrap();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn noop_reranker_leaves_results_unchanged() {
    let mut config = RagConfig::default();
    config.similarity_threshold = -1.0;
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
        .generator(Arc::new(MockGenerator::new("ok")))
        .reranker(Arc::new(NoOpReranker))
        .build()
        .unwrap();
    pipeline.create_collection().await.unwrap();
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();

    let results = pipeline.retrieve("How much notice?", Some(3)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.document_id, "policy.md");
}

#[tokio::test]
async fn clear_empties_the_collection() {
    let pipeline = build_pipeline("ok", RagConfig::default()).await;
    pipeline.ingest(DocumentSource::text("policy.md", POLICY_TEXT)).await.unwrap();
    assert!(pipeline.stats().await.unwrap().chunk_count > 0);

    pipeline.clear().await.unwrap();
    assert_eq!(pipeline.stats().await.unwrap().chunk_count, 0);

    let results = pipeline.retrieve("notice?", None).await.unwrap();
    assert!(results.is_empty());
}

// Generator trait object sanity: the pipeline accepts any Generator impl.
#[test]
fn accepts_any_generator_implementation() {
    fn assert_generator<T: Generator>() {}
    assert_generator::<MockGenerator>();
    assert_generator::<FailingGenerator>();
}
