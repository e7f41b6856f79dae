//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::auth::{Authorizer, StaffOrCreator};
use crate::config::Config;
use crate::flags::{ConfiguredFlags, FeatureToggle};
use crate::store::{LinkStore, MemoryLinkStore, SqliteLinkStore};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Link lookups.
    pub store: Arc<dyn LinkStore>,

    /// Who may view private links.
    pub authorizer: Arc<dyn Authorizer>,

    /// Feature flags, evaluated per request.
    pub flags: Arc<dyn FeatureToggle>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Opens the configured link database, or starts with an empty in-memory
    /// store when none is configured.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn LinkStore> = match &config.link_db_path {
            Some(path) => Arc::new(SqliteLinkStore::open(path)?),
            None => {
                tracing::warn!("PERMA_LINK_DB_PATH not set, serving from an empty in-memory store");
                Arc::new(MemoryLinkStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create application state around an existing store.
    pub fn with_store(config: Config, store: Arc<dyn LinkStore>) -> Self {
        let flags = ConfiguredFlags {
            wacz_playback: config.wacz_playback,
        };

        tracing::info!(
            wacz_playback = ?flags.wacz_playback,
            proxy_hops = config.trusted_proxies.len(),
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            store,
            authorizer: Arc::new(StaffOrCreator),
            flags: Arc::new(flags),
        }
    }

    /// Replace the private-link authorization policy.
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    /// Replace the feature flag evaluator.
    pub fn with_flags(mut self, flags: impl FeatureToggle + 'static) -> Self {
        self.flags = Arc::new(flags);
        self
    }
}
