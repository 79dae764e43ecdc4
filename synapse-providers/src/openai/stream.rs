//! Streaming implementation for the chat-completions API

use crate::http::ResponseStream;
use crate::openai::parser::OpenAIParser;
use crate::sse::SseDecoder;
use futures_core::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use synapse_core::Error;

/// Ordered text fragments of a streamed completion
///
/// Finite and not restartable. Ends after the `[DONE]` sentinel, at end of
/// input, or after yielding a transport error.
pub struct OpenAIStream {
    inner: ResponseStream,
    decoder: SseDecoder<OpenAIParser>,
    pending: VecDeque<String>,
    finished: bool,
}

impl OpenAIStream {
    /// Decode fragments from a response body
    pub fn new(body: ResponseStream) -> Self {
        Self {
            inner: body,
            decoder: SseDecoder::new(OpenAIParser),
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

impl Stream for OpenAIStream {
    type Item = Result<String, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Poll::Ready(Some(Ok(fragment)));
            }
            if self.finished || self.decoder.is_done() {
                return Poll::Ready(None);
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let fragments = self.decoder.feed(&chunk);
                    self.pending.extend(fragments);
                }
                Poll::Ready(Some(Err(e))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    self.decoder.finish();
                    self.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
