use std::sync::Arc;

use anyhow::Context;
use audit_config::AuditConfig;
use audit_core::ports::{CaptureDevice, CatalogClient, DraftStore, MutationClient};
use audit_remote::{RecordStoreClient, RetryConfig};
use audit_store::AuditStore;
use audit_sync::EngineContext;

use crate::capture::FileCapture;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: AuditConfig,
    pub store: Arc<AuditStore>,
    pub remote: Arc<RecordStoreClient>,
}

impl AppContext {
    /// Open the local draft store and build the record store client.
    ///
    /// Nothing here touches the network, so offline commands work with an
    /// unconfigured remote section.
    pub async fn init(config: AuditConfig) -> anyhow::Result<Self> {
        let db_path = config.store.resolved_path();
        let store = AuditStore::open_local(&db_path)
            .await
            .with_context(|| format!("failed to open draft store at {}", db_path.display()))?;

        let remote = RecordStoreClient::new(&config.remote)
            .context("failed to build record store client")?
            .with_retry(RetryConfig::with_attempts(config.sync.read_retries));

        Ok(Self {
            config,
            store: Arc::new(store),
            remote: Arc::new(remote),
        })
    }

    /// Fail early for commands that need the record store.
    pub fn require_remote(&self) -> anyhow::Result<()> {
        self.config
            .remote
            .require_configured()
            .context("this command talks to the record store")
    }

    /// Collaborators for one engine instance.
    #[must_use]
    pub fn engine(&self, capture: FileCapture) -> EngineContext {
        EngineContext::new(
            Arc::clone(&self.remote) as Arc<dyn CatalogClient>,
            Arc::clone(&self.remote) as Arc<dyn MutationClient>,
            Arc::new(capture) as Arc<dyn CaptureDevice>,
            Arc::clone(&self.store) as Arc<dyn DraftStore>,
        )
        .with_max_parallel(self.config.sync.max_parallel)
    }
}
