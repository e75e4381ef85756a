use std::sync::Arc;

use twilight_http::Client;

use warden_store::protected::ProtectedStore;
use warden_store::PunishmentStore;

/// Environment-driven runtime configuration.
pub mod config;
/// Deferred reversal execution.
pub mod scheduler;

pub use config::Config;
pub use scheduler::{ReversalHandle, Scheduler};

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    pub store: PunishmentStore,
    pub protected: ProtectedStore,
    pub scheduler: Scheduler,
    pub config: Arc<Config>,
}

impl Context {
    /// Create a new application context.
    pub fn new(
        http: Arc<Client>,
        store: PunishmentStore,
        protected: ProtectedStore,
        scheduler: Scheduler,
        config: Config,
    ) -> Self {
        Self {
            http,
            store,
            protected,
            scheduler,
            config: Arc::new(config),
        }
    }
}
