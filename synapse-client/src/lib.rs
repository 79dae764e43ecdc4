//! High-level API for the Synapse assistant
//!
//! [`Gateway`] sends completions through the active provider profile.
//! [`Synapse`] wires settings, history and the gateway together over one
//! persisted document and adds chat calls that record their exchange.

mod context;
mod gateway;
mod stateful;

pub use context::Synapse;
pub use gateway::Gateway;

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{Gateway, Synapse};
    pub use synapse_core::{CompletionProvider, Message, Role};
}
