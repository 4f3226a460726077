//! # askbase-model
//!
//! Language-model backends for Askbase. Each backend implements
//! [`askbase_core::Generator`], the seam through which the RAG pipeline
//! requests grounded answers.
//!
//! ## Backends
//!
//! - [`OpenAIGenerator`] — OpenAI chat models, and any OpenAI-compatible
//!   server (Ollama, vLLM, LM Studio) via
//!   [`compatible`](openai::OpenAIGenerator::compatible)
//! - [`MockGenerator`] — deterministic generator for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use askbase_model::openai::{OpenAIConfig, OpenAIGenerator};
//!
//! // Hosted OpenAI
//! let generator = OpenAIGenerator::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY").unwrap(),
//!     "gpt-4o-mini",
//! ))?;
//!
//! // Local Ollama
//! let local = OpenAIGenerator::compatible("ollama", "http://localhost:11434/v1", "llama3.2:3b")?;
//! ```
//!
//! ## Features
//!
//! - Async streaming generation
//! - Generation configuration (temperature, max tokens)
//! - OpenAI-compatible APIs behind the `openai` feature (on by default)

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::MockGenerator;
#[cfg(feature = "openai")]
pub use openai::OpenAIGenerator;
