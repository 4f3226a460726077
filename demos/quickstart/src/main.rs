//! # Quickstart
//!
//! Demonstrates the core pipeline end to end: ingest documents, then ask
//! questions in blocking and streaming mode.
//!
//! Uses `InMemoryVectorStore`, `RecursiveChunker`, a deterministic
//! `HashEmbeddingProvider`, and `MockGenerator`, so it runs with **zero API
//! keys**.
//!
//! Run: `cargo run -p quickstart`

use std::sync::Arc;

use futures::StreamExt;

use askbase_model::MockGenerator;
use askbase_rag::{
    AnswerEvent, DocumentSource, EmbeddingProvider, InMemoryVectorStore, QueryOptions, RagConfig,
    RagPipeline, RecursiveChunker,
};

// ---------------------------------------------------------------------------
// HashEmbeddingProvider — deterministic hash-based embeddings for demos/tests
// ---------------------------------------------------------------------------

struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> askbase_rag::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then generate a
        // normalised vector whose direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalise so cosine similarity is just the dot product.
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // -- 1. Configure the pipeline ----------------------------------------
    // chunk_size=200 keeps chunks small for this demo; overlap=50 ensures
    // context is shared between adjacent chunks; top_k=3 returns the three
    // most relevant results.
    let config = RagConfig::builder()
        .chunk_size(200)
        .chunk_overlap(50)
        .top_k(3)
        .collection("handbook")
        .build()?;

    // -- 2. Build the pipeline with in-process components ------------------
    // HashEmbeddingProvider produces 64-dimensional vectors from text hashes.
    // InMemoryVectorStore stores everything in a HashMap — no external DB.
    // MockGenerator stands in for a real language model.
    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(HashEmbeddingProvider::new(64)))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .chunker(Arc::new(RecursiveChunker::new(200, 50)))
            .generator(Arc::new(MockGenerator::new(
                "PTO requests need 2 weeks notice, per the source [policy.md].",
            )))
            .build()?,
    );

    pipeline.create_collection().await?;

    // -- 3. Ingest sample documents ----------------------------------------
    let sources = vec![
        DocumentSource::text(
            "policy.md",
            "Remote work requires manager approval. PTO requests need 2 weeks notice. \
             Expense reports are due by the 5th of each month.",
        ),
        DocumentSource::text(
            "onboarding.md",
            "New hires receive a laptop on day one. Security training must be completed \
             within the first week. Badge access is granted by facilities.",
        ),
    ];

    for source in sources {
        let report = pipeline.ingest(source).await?;
        println!(
            "ingested: {} document(s), {} chunk(s), {} failure(s)",
            report.documents_processed,
            report.chunks_created,
            report.failures.len(),
        );
    }

    let stats = pipeline.stats().await?;
    println!("index: {} chunk(s) in '{}'\n", stats.chunk_count, stats.collection);

    // -- 4. Ask a question (blocking) --------------------------------------
    let question = "How much notice is needed for PTO?";
    println!("Q: {question}");

    let answer = pipeline.answer(question, &QueryOptions::default()).await?;
    println!("A: {} ({} ms)", answer.text, answer.elapsed_ms);
    for citation in &answer.citations {
        println!("   source: {} [score={:.4}]", citation.source_id, citation.score);
    }

    // -- 5. Ask again, streaming -------------------------------------------
    println!("\nQ (streaming): {question}");
    print!("A: ");
    let mut stream = pipeline.answer_stream(question, &QueryOptions::default()).await?;
    while let Some(event) = stream.next().await {
        match event? {
            AnswerEvent::Delta(delta) => print!("{delta}"),
            AnswerEvent::Sources(citations) => {
                println!();
                for citation in &citations {
                    println!("   source: {} [score={:.4}]", citation.source_id, citation.score);
                }
            }
        }
    }

    Ok(())
}
