//! Composition root. [`Console`] builds every collaborator once and hands
//! each one exactly the dependencies it needs; nothing below it reaches for
//! globals.

use crate::{
    cache::ResponseCache,
    config::ClientConfig,
    errors::ClientError,
    features::{
        auth::{AuthClient, SessionState},
        crew::CrewClient,
        dashboard::DashboardClient,
        rbac::RbacClient,
    },
    notify::{MemoryNotifier, Notifier},
    router::{Navigator, Router},
    storage::{Credentials, FileStore},
    transport::Transport,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Console {
    pub credentials: Credentials,
    pub notifier: Arc<MemoryNotifier>,
    pub router: Arc<Router>,
    pub transport: Transport,
    pub auth: AuthClient,
    pub rbac: RbacClient,
    pub crew: CrewClient,
    pub dashboard: DashboardClient,
    pub cache: Arc<ResponseCache>,
    pub session: SessionState,
}

impl Console {
    /// # Errors
    /// Returns [`ClientError::Config`] when the transport cannot be built.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, ClientError> {
        let notifier = Arc::new(MemoryNotifier::new());
        let router = Arc::new(Router::new(credentials.clone()));

        let transport = Transport::new(
            config,
            credentials.clone(),
            notifier.clone() as Arc<dyn Notifier>,
            router.clone() as Arc<dyn Navigator>,
        )?;

        let auth = AuthClient::new(transport.clone());
        let rbac = RbacClient::new(&transport);
        let crew = CrewClient::new(&transport);
        let dashboard = DashboardClient::new(transport.clone());
        let cache = Arc::new(ResponseCache::new(rbac.clone(), dashboard.clone()));
        let session = SessionState::new(auth.clone(), credentials.clone(), cache.clone());

        debug!("Console ready for {}", transport.config().api_base());

        Ok(Self {
            credentials,
            notifier,
            router,
            transport,
            auth,
            rbac,
            crew,
            dashboard,
            cache,
            session,
        })
    }

    /// Console whose credentials persist in `store`.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when the transport cannot be built.
    pub fn with_file_store(config: ClientConfig, store: FileStore) -> Result<Self, ClientError> {
        Self::new(config, Credentials::new(Arc::new(store)))
    }

    /// Restores the session from stored credentials and moves the router to
    /// the landing location that matches it.
    ///
    /// # Errors
    /// Returns [`ClientError::Navigation`] if the landing redirect does not settle.
    pub async fn initialize(&self) -> Result<(), ClientError> {
        self.session.initialize().await;
        self.router.navigate(&self.router.current_path())?;
        Ok(())
    }
}
