//! LLM prompts and reply parsing for online drug search.
//!
//! The completion backend is abstracted behind [`CompletionBackend`] so the
//! search can run against a local model, a hosted API, or [`MockCompletion`].

pub mod extraction;
pub mod prompts;

pub use extraction::*;
pub use prompts::*;
