//! MockGenerator tests: blocking/streaming equivalence and prompt recording.

use futures::StreamExt;

use askbase_core::Generator;
use askbase_model::MockGenerator;

#[tokio::test]
async fn streaming_concatenates_to_the_blocking_reply() {
    let generator = MockGenerator::new("PTO requests need 2 weeks notice.");

    let blocking = generator.generate("prompt").await.unwrap();

    let mut stream = generator.generate_stream("prompt").await.unwrap();
    let mut streamed = String::new();
    let mut increments = 0;
    while let Some(delta) = stream.next().await {
        streamed.push_str(&delta.unwrap());
        increments += 1;
    }

    assert_eq!(streamed, blocking);
    assert!(increments > 1, "streaming should yield multiple increments");
}

#[tokio::test]
async fn prompts_are_recorded_in_order() {
    let generator = MockGenerator::new("reply");

    generator.generate("first prompt").await.unwrap();
    let _ = generator.generate_stream("second prompt").await.unwrap();

    assert_eq!(generator.prompts(), vec!["first prompt", "second prompt"]);
}

#[tokio::test]
async fn empty_reply_streams_nothing() {
    let generator = MockGenerator::new("");
    let mut stream = generator.generate_stream("prompt").await.unwrap();
    // split_inclusive on an empty string yields no pieces.
    assert!(stream.next().await.is_none());
}
