//! Chat calls that record their exchange in the history

use crate::Synapse;
use futures::StreamExt;
use synapse_core::{CompletionProvider, Error, Result, Role};
use synapse_state::{ChatMessage, StateError};
use tracing::{debug, warn};

impl Synapse {
    /// Send `prompt` and record both sides of the exchange in `session_id`
    ///
    /// The user message is recorded before the request. The reply is
    /// recorded only when the request succeeds.
    pub async fn chat(
        &self,
        session_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String> {
        self.record(session_id, Role::User, prompt).await?;

        let reply = self.gateway.complete(prompt, system_prompt).await?;
        self.record(session_id, Role::Assistant, reply.as_str()).await?;

        Ok(reply)
    }

    /// Stream a reply to `prompt`, handing each fragment to `on_fragment`
    ///
    /// Records the user message, then an empty assistant message once the
    /// stream is open; the accumulated text is written into it when the stream
    /// ends. If the stream fails part-way, the text received so far is kept
    /// and the error is returned. Returns the full reply text.
    pub async fn stream_chat<F>(
        &self,
        session_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
        mut on_fragment: F,
    ) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        self.record(session_id, Role::User, prompt).await?;

        let mut stream = self.gateway.stream_complete(prompt, system_prompt).await?;
        let placeholder = self.record(session_id, Role::Assistant, "").await?;

        let mut text = String::new();
        let mut failure = None;
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(fragment) => {
                    on_fragment(&fragment);
                    text.push_str(&fragment);
                }
                Err(e) => {
                    warn!(error = %e, received = text.len(), "Stream failed part-way");
                    failure = Some(e);
                    break;
                }
            }
        }

        self.history
            .update_message_content(session_id, &placeholder.id, text.as_str())
            .await?;
        debug!(session = %session_id, chars = text.chars().count(), "Streamed reply recorded");

        match failure {
            Some(e) => Err(e),
            None => Ok(text),
        }
    }

    async fn record(&self, session_id: &str, role: Role, content: &str) -> Result<ChatMessage> {
        self.history
            .add_message(session_id, role, content)
            .await?
            .ok_or_else(|| Error::from(StateError::not_found(format!("session '{}'", session_id))))
    }
}
