//! Application context wiring the stores and the gateway together

use crate::Gateway;
use std::path::Path;
use std::sync::Arc;
use synapse_core::{IdGenerator, Result, UuidGenerator};
use synapse_providers::{HttpClient, ReqwestClient};
use synapse_state::{
    DocumentStore, FileDocumentStore, HistoryStore, LoadReport, SettingsStore, SharedDocument,
};
use tracing::info;

/// Settings, history and gateway built over one persisted document
///
/// Construct it once at startup and pass it (or its parts) to whatever needs
/// them.
///
/// # Example
///
/// ```no_run
/// use synapse_client::Synapse;
///
/// # async fn example() -> synapse_core::Result<()> {
/// let synapse = Synapse::open_file("data.json").await?;
/// let session = synapse.history().create_session().await?;
/// let reply = synapse.chat(&session.id, "Hello!", None).await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Synapse {
    pub(crate) settings: Arc<SettingsStore>,
    pub(crate) history: Arc<HistoryStore>,
    pub(crate) gateway: Gateway,
    load_report: LoadReport,
}

impl Synapse {
    /// Load settings and history from `store` and send requests through
    /// `http`
    pub async fn open(store: Arc<dyn DocumentStore>, http: Arc<dyn HttpClient>) -> Result<Self> {
        Self::open_with_ids(store, http, Arc::new(UuidGenerator)).await
    }

    /// Like [`open`](Self::open) with a custom id source
    pub async fn open_with_ids(
        store: Arc<dyn DocumentStore>,
        http: Arc<dyn HttpClient>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        let document = Arc::new(SharedDocument::new(store));

        let settings = Arc::new(SettingsStore::new(document.clone(), ids.clone()));
        let load_report = settings.load().await?;

        let history = Arc::new(HistoryStore::new(document, ids));
        history.initialize().await?;

        let gateway = Gateway::new(settings.clone(), http);

        info!(
            migrated = load_report.migrated,
            defaults = load_report.validation_error.is_some(),
            "Synapse context ready"
        );

        Ok(Self {
            settings,
            history,
            gateway,
            load_report,
        })
    }

    /// Persist to a JSON file and talk HTTP with reqwest
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let store = Arc::new(FileDocumentStore::new(path));
        let http = Arc::new(ReqwestClient::new()?);
        Self::open(store, http).await
    }

    /// Provider profile settings
    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Conversation history
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Completion gateway
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// How settings were loaded, including any validation failure that
    /// forced the defaults
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}
