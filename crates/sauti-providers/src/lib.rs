//! Narrow capability interfaces over the external providers.
//!
//! Handlers only ever see `ChatCompleter` and `Messenger`, so the core
//! logic stays testable with fakes and decoupled from any provider's
//! wire format.

pub mod llm;
pub mod sms;

pub use llm::GroqClient;
pub use sms::TwilioClient;

use anyhow::Result;
use async_trait::async_trait;

/// A hosted language-model completion endpoint.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// One-shot completion: system instruction plus user text, no history.
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String>;
}

/// An outbound messaging provider (SMS).
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send `body` to `to`, returning the provider's message id.
    async fn send_message(&self, to: &str, body: &str) -> Result<String>;
}
