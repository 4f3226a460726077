//! Grounded prompt assembly.
//!
//! The [`PromptAssembler`] merges retrieved chunks and the question into a
//! single prompt: numbered, source-tagged context passages followed by an
//! instruction to answer only from that context and to cite sources by
//! identifier. When nothing was retrieved, the prompt explicitly instructs
//! the model to say that no relevant information was found instead of
//! answering from outside knowledge.

use crate::document::SearchResult;

/// Instruction appended after the context passages.
const GROUNDING_INSTRUCTIONS: &str = "Answer the question using ONLY the context passages above. \
Be concise and factual. If the context does not contain enough information to answer fully, \
say so. Cite the sources you used by their identifiers in square brackets.";

/// Instruction used when retrieval produced no context.
const NO_CONTEXT_INSTRUCTIONS: &str = "No relevant information was found in the knowledge base \
for this question. State that no relevant information was found. Do not answer from outside \
knowledge.";

/// Assembles retrieval results and a question into a grounded prompt.
pub struct PromptAssembler {
    max_context_chars: usize,
}

impl PromptAssembler {
    /// Create an assembler with a context budget in characters.
    ///
    /// The budget applies to chunk text; passage headers and instructions
    /// are not counted against it.
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Build the prompt for a question and its retrieved context.
    ///
    /// Passages appear in retrieval order, each tagged
    /// `[Source N: <identifier>]`. Passages are admitted highest-ranked
    /// first until the context budget runs out; the first passage that does
    /// not fit whole is truncated to the remaining budget and the rest are
    /// dropped, so the highest-ranked context is always preserved in full.
    pub fn assemble(&self, question: &str, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return format!("{NO_CONTEXT_INSTRUCTIONS}\n\nQuestion: {question}\n\nAnswer:");
        }

        let mut blocks: Vec<String> = Vec::new();
        let mut used = 0;

        for (i, result) in results.iter().enumerate() {
            let remaining = self.max_context_chars - used;
            if remaining == 0 {
                break;
            }

            let label = result
                .chunk
                .metadata
                .get("title")
                .filter(|t| !t.is_empty())
                .unwrap_or(&result.chunk.document_id);
            let text = clip(&result.chunk.text, remaining);
            if text.is_empty() {
                break;
            }

            used += text.len();
            blocks.push(format!("[Source {}: {}]\n{}", i + 1, label, text));
        }

        format!(
            "Context:\n\n{}\n\n{}\n\nQuestion: {}\n\nAnswer:",
            blocks.join("\n\n---\n\n"),
            GROUNDING_INSTRUCTIONS,
            question,
        )
    }
}

/// Clip text to at most `max_len` bytes at a character boundary.
fn clip(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
