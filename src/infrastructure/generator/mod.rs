//! Draft generators
//!
//! `OpenAiDraftGenerator` talks to any OpenAI-compatible chat-completions
//! endpoint; prompts are built by [`prompt`].

pub mod openai;
pub mod prompt;
pub mod types;

pub use openai::OpenAiDraftGenerator;
