//! OpenAI-compatible chat-completions client

mod config;
mod converter;
mod parser;
mod provider;
mod stream;

pub use config::OpenAIConfig;
pub use converter::{token_limit_field, OpenAIConverter};
pub use parser::OpenAIParser;
pub use provider::OpenAI;
pub use stream::OpenAIStream;
