//! Core traits and types for the Synapse assistant gateway
//!
//! This crate holds the abstractions shared by the provider, state and client
//! crates: the error taxonomy, wire message types, provider profiles and the
//! [`CompletionProvider`] trait.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod id;
pub mod provider;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use id::{IdGenerator, UuidGenerator};
pub use provider::CompletionProvider;
pub use types::{
    message::{prompt_messages, Message, Role},
    profile::{ProviderKind, ProviderProfile, DEFAULT_BASE_URL, DEFAULT_MODEL_ID},
};
