//! Chat-completion provider client for the Synapse gateway
//!
//! [`openai::OpenAI`] performs single-shot and streaming requests against an
//! OpenAI-style `chat/completions` endpoint; [`sse::SseDecoder`] turns the
//! streamed bytes into ordered text fragments.

#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod http;
pub mod openai;
pub mod sse;
pub mod traits;

pub use http::{HeaderMap, HttpClient, HttpResponse, ReqwestClient, ResponseStream, StreamingResponse};
pub use openai::{OpenAI, OpenAIConfig, OpenAIStream};
pub use sse::SseDecoder;

// Re-export common traits
pub use traits::{RequestConverter, ResponseParser, StreamEventParser};
