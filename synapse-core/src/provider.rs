//! Core provider trait for completion requests

use crate::error::Result;
use async_trait::async_trait;

/// A client for one configured completion endpoint
///
/// Both modes build the same request from a prompt and an optional system
/// prompt. Neither mode can be cancelled once issued: a call runs to completion
/// or failure.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Ordered, finite, non-restartable sequence of text fragments
    type Stream: futures_core::Stream<Item = Result<String>> + Send + Unpin;

    /// Send a request and return the complete response text
    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String>;

    /// Send a streaming request and return the response as fragments
    async fn stream_complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<Self::Stream>;
}
