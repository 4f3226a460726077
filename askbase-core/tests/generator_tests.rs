//! Generator trait tests: the default blocking implementation drains the
//! stream, and stream errors propagate.

use async_trait::async_trait;
use futures::stream;

use askbase_core::{AskError, Generator, Result, TextStream};

/// A generator that only knows how to stream.
struct StreamOnly {
    pieces: Vec<&'static str>,
    fail_after: Option<usize>,
}

#[async_trait]
impl Generator for StreamOnly {
    fn name(&self) -> &str {
        "stream-only"
    }

    async fn generate_stream(&self, _prompt: &str) -> Result<TextStream> {
        let mut items: Vec<Result<String>> =
            self.pieces.iter().map(|p| Ok(p.to_string())).collect();
        if let Some(after) = self.fail_after {
            items.truncate(after);
            items.push(Err(AskError::Stream("connection reset".to_string())));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

#[tokio::test]
async fn default_generate_concatenates_the_stream() {
    let generator = StreamOnly { pieces: vec!["grounded ", "answer"], fail_after: None };
    let text = generator.generate("prompt").await.unwrap();
    assert_eq!(text, "grounded answer");
}

#[tokio::test]
async fn default_generate_propagates_stream_errors() {
    let generator = StreamOnly { pieces: vec!["grounded ", "answer"], fail_after: Some(1) };
    let err = generator.generate("prompt").await.unwrap_err();
    assert!(matches!(err, AskError::Stream(_)));
}
