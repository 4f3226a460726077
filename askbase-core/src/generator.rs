//! The language-model seam.
//!
//! [`Generator`] is the narrow contract through which the pipeline invokes a
//! language model: a prompt string in, generated text out, either whole or as
//! a lazy stream of increments. Any conforming implementation can be
//! substituted: a remote API client, a local model, or a deterministic mock.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::Result;

/// A lazy, finite, non-restartable sequence of generated text increments.
///
/// The consumer may drop the stream at any point to cancel generation; early
/// termination is a normal path, not an error. A failed item ends the stream.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A language model invoked with a fully assembled prompt.
///
/// The default [`generate`](Generator::generate) implementation drains
/// [`generate_stream`](Generator::generate_stream) and concatenates the
/// increments; backends with a cheaper non-streaming call should override it.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A short identifier for this backend (typically the model name).
    fn name(&self) -> &str;

    /// Generate a complete response for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut stream = self.generate_stream(prompt).await?;
        let mut text = String::new();
        while let Some(delta) = stream.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }

    /// Generate a response as a stream of text increments.
    ///
    /// Concatenating every increment of a successful stream yields the same
    /// text a blocking [`generate`](Generator::generate) call would return.
    async fn generate_stream(&self, prompt: &str) -> Result<TextStream>;
}
