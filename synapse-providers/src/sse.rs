//! Incremental decoder for server-sent chat-completion streams
//!
//! Network chunks arrive with boundaries that have nothing to do with line or
//! event boundaries. [`SseDecoder`] keeps the bytes of the current unfinished
//! line between calls and only looks at a line once its terminating newline has
//! been seen, so the fragments produced depend only on the concatenated bytes,
//! never on how they were split.
//!
//! Per complete line:
//! - the line is trimmed; lines not starting with `data: ` are ignored
//!   (other event fields, comments, keep-alives);
//! - a `[DONE]` payload ends decoding, anything after it is dropped;
//! - any other payload goes to a [`StreamEventParser`]; a payload that fails to
//!   parse is logged and skipped without ending the stream.
//!
//! Bytes left over when the input ends without a trailing newline are
//! discarded.

use crate::constants::{SSE_DATA_PREFIX, SSE_DONE_SENTINEL};
use crate::traits::StreamEventParser;
use tracing::{debug, trace, warn};

/// What a single complete line contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A text fragment to emit
    Fragment(String),
    /// The termination sentinel
    Done,
    /// Nothing to emit
    Skip,
}

/// Buffering state machine turning byte chunks into text fragments
#[derive(Debug)]
pub struct SseDecoder<P> {
    parser: P,
    buffer: Vec<u8>,
    done: bool,
}

impl<P: StreamEventParser> SseDecoder<P> {
    /// Create a decoder using `parser` for event payloads
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Whether the termination sentinel or end of input has been reached
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Append a chunk and return the fragments from every line it completed,
    /// in line order. Returns nothing once the decoder is done.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }

        self.buffer.extend_from_slice(chunk);

        // Newline bytes never occur inside a multi-byte UTF-8 sequence, so
        // splitting before decoding cannot tear a character.
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.buffer[start..end]).into_owned();
            start = end + 1;

            match self.decode_line(&line) {
                LineOutcome::Fragment(text) => fragments.push(text),
                LineOutcome::Done => {
                    debug!("Stream termination sentinel received");
                    self.done = true;
                    self.buffer.clear();
                    return fragments;
                }
                LineOutcome::Skip => {}
            }
        }

        self.buffer.drain(..start);
        fragments
    }

    /// Signal end of input. Any unfinished line is dropped; returns how many
    /// bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buffer.len();
        if discarded > 0 {
            trace!(bytes = discarded, "Discarding incomplete trailing line");
        }
        self.buffer.clear();
        self.done = true;
        discarded
    }

    /// Classify one complete line
    pub fn decode_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        let Some(payload) = line.strip_prefix(SSE_DATA_PREFIX) else {
            return LineOutcome::Skip;
        };

        if payload == SSE_DONE_SENTINEL {
            return LineOutcome::Done;
        }

        match self.parser.parse_event(payload) {
            Ok(Some(text)) if !text.is_empty() => LineOutcome::Fragment(text),
            Ok(_) => LineOutcome::Skip,
            Err(e) => {
                warn!(error = %e, payload, "Skipping malformed stream event");
                LineOutcome::Skip
            }
        }
    }
}
