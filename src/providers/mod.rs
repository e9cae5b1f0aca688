//! Completion provider implementations

use async_trait::async_trait;

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiClient;

/// A remote completion backend: prompt in, generated text out.
#[async_trait]
pub trait CompletionProvider: Send + Sync
{   async fn complete(&self, prompt: &str)
      -> Result<String, crate::error::Error>;
}
