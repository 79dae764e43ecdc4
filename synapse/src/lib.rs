//! Synapse: an LLM gateway and conversation store for editor assistants
//!
//! Send typed or selected text to an OpenAI-style chat-completions endpoint,
//! get the answer whole or as a stream of fragments, and keep multi-session
//! history and several named provider profiles in one persisted JSON
//! document.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "client")]
//! # async fn example() -> synapse::Result<()> {
//! use synapse::prelude::*;
//!
//! synapse::logging::init();
//!
//! let app = Synapse::open_file("synapse.json").await?;
//! let session = app.history().create_session().await?;
//!
//! let reply = app
//!     .stream_chat(&session.id, "Explain ownership", None, |fragment| {
//!         print!("{}", fragment)
//!     })
//!     .await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export core types
pub use synapse_core::*;

pub mod logging;

#[cfg(feature = "providers")]
#[cfg_attr(docsrs, doc(cfg(feature = "providers")))]
pub mod providers {
    //! Chat-completions client and stream decoder
    pub use synapse_providers::*;
}

#[cfg(feature = "state")]
#[cfg_attr(docsrs, doc(cfg(feature = "state")))]
pub mod state {
    //! Settings and history persistence
    pub use synapse_state::*;
}

#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client {
    //! Gateway facade and application context
    pub use synapse_client::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use synapse_core::{CompletionProvider, Error, Message, ProviderProfile, Role};

    #[cfg(feature = "providers")]
    pub use synapse_providers::{OpenAI, OpenAIConfig};

    #[cfg(feature = "state")]
    pub use synapse_state::{ChatMessage, ChatSession, HistoryStore, Settings, SettingsStore};

    #[cfg(feature = "client")]
    pub use synapse_client::{Gateway, Synapse};
}
