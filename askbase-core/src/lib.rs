//! # askbase-core
//!
//! Shared building blocks for the Askbase question-answering stack:
//!
//! - [`AskError`] — the error type produced by generator backends
//! - [`Generator`] — the trait every language-model backend implements
//! - [`TextStream`] — the lazy stream of generated text increments
//!
//! Concrete backends live in `askbase-model`; the retrieval pipeline that
//! consumes them lives in `askbase-rag`.

pub mod error;
pub mod generator;

pub use error::{AskError, Result};
pub use generator::{Generator, TextStream};
