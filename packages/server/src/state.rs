//! Shared application state

use crate::ai::{provider_from_config, CompletionProvider, DisabledProvider};
use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::ServerResult;
use pharmasite_editor::{seed_defaults, EditSession, ErrorBus, SavingSet, DEFAULT_WRITE_TIMEOUT};
use pharmasite_store::{AccessRules, ContentStore, Principal};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub bus: ErrorBus,
    pub auth: Authenticator,
    pub ai: Arc<dyn CompletionProvider>,
    pub uploads_dir: PathBuf,
    pub public_dir: Option<PathBuf>,
    pub write_timeout: Duration,
    /// Per-user saving indicators, so one editor's double submit is refused
    /// without blocking anyone else
    saving: Arc<Mutex<HashMap<String, SavingSet>>>,
}

impl AppState {
    pub fn new(store: Arc<ContentStore>, auth: Authenticator) -> Self {
        Self {
            store,
            bus: ErrorBus::new(),
            auth,
            ai: Arc::new(DisabledProvider),
            uploads_dir: PathBuf::from("public/uploads"),
            public_dir: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            saving: Arc::default(),
        }
    }

    pub fn with_ai(mut self, ai: Arc<dyn CompletionProvider>) -> Self {
        self.ai = ai;
        self
    }

    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = dir.into();
        self
    }

    pub fn with_public_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.public_dir = dir;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Open the store, seed first-run content and wire everything `config`
    /// names, resolving paths against `cwd`
    pub async fn from_config(config: &Config, cwd: &Path) -> ServerResult<Self> {
        let store = match &config.data_file {
            Some(file) => {
                let path = config.resolve(cwd, file);
                info!(path = %path.display(), "Opening content store");
                ContentStore::open(path, AccessRules::default())?
            }
            None => {
                info!("Using an in-memory content store");
                ContentStore::in_memory(AccessRules::default())
            }
        };
        seed_defaults(&store.client(Principal::Service)).await?;

        let env_admin = std::env::var("ADMIN_EMAIL")
            .ok()
            .zip(std::env::var("ADMIN_PASSWORD").ok())
            .filter(|(email, password)| !email.is_empty() && !password.is_empty());
        let auth = Authenticator::from_config(&config.session, &config.accounts, env_admin)?;

        let uploads_dir = config.resolve(cwd, &config.uploads_dir);
        std::fs::create_dir_all(&uploads_dir)?;

        Ok(Self::new(store, auth)
            .with_ai(provider_from_config(&config.ai))
            .with_uploads_dir(uploads_dir)
            .with_public_dir(config.public_dir.as_deref().map(|dir| config.resolve(cwd, dir)))
            .with_write_timeout(config.write_timeout()))
    }

    fn saving_for(&self, principal: &Principal) -> SavingSet {
        let Principal::User { email, .. } = principal else {
            return SavingSet::new();
        };

        self.saving
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(email.to_ascii_lowercase())
            .or_default()
            .clone()
    }

    /// Edit session acting as `principal`
    pub fn session(&self, principal: &Principal) -> EditSession {
        EditSession::new(Arc::new(self.store.client(principal.clone())), self.bus.clone())
            .with_saving(self.saving_for(principal))
            .with_write_timeout(self.write_timeout)
    }
}
