//! Language-model access and the chat widget's responder.
//!
//! [`CompletionClient`] is the seam to the remote model. [`OpenAiClient`]
//! speaks the chat-completions protocol; [`MockCompletionClient`] scripts
//! replies for tests and offline runs. [`ChatResponder`] turns a transcript
//! plus a new user message into an assistant reply, never failing.

pub mod error;
pub mod llm;
pub mod responder;

pub use error::{ChatError, LlmError};
pub use llm::{CompletionClient, MockCompletionClient, OpenAiClient};
pub use responder::ChatResponder;
