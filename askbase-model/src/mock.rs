//! Mock generator for testing.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use askbase_core::{Generator, Result, TextStream};

/// A deterministic [`Generator`] that returns a fixed reply.
///
/// Streaming splits the reply at word boundaries, so concatenating the
/// stream's increments always equals the blocking reply. Prompts seen by
/// the mock are recorded and can be inspected with
/// [`prompts`](MockGenerator::prompts), which is handy for asserting what
/// the pipeline actually sent to the model.
///
/// # Example
///
/// ```rust,ignore
/// use askbase_model::MockGenerator;
///
/// let generator = MockGenerator::new("PTO requests need 2 weeks notice.");
/// let text = generator.generate("ignored").await?;
/// assert_eq!(text, "PTO requests need 2 weeks notice.");
/// ```
#[derive(Debug, Default)]
pub struct MockGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Create a mock that answers every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), prompts: Mutex::new(Vec::new()) }
    }

    /// The prompts this mock has been called with, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        Ok(self.reply.clone())
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream> {
        self.record(prompt);
        let pieces: Vec<Result<String>> =
            self.reply.split_inclusive(' ').map(|piece| Ok(piece.to_string())).collect();
        Ok(Box::pin(stream::iter(pieces)))
    }
}
