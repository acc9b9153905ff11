use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use gfv_analysis::{AnalysisEngine, GeminiAnalysisEngine};
use gfv_core::config::{AppConfig, ConfigError, LoadOptions};
use gfv_store::{LocalOperationStore, OperationStore, RestOperationStore, StoreError};

use crate::session::ConsoleSession;

pub struct Application {
    pub config: AppConfig,
    pub session: ConsoleSession,
    pub analysis: Option<Arc<dyn AnalysisEngine>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("store client could not be created: {0}")]
    StoreClient(#[source] StoreError),
    #[error("initial load from the store failed: {0}")]
    InitialLoad(#[source] StoreError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Pick the store implementation once, load the initial collection, and
/// assemble the session. Missing store credentials select local mode;
/// a configured store that fails its initial load is a startup error.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "console.bootstrap.start", "starting console bootstrap");

    let (store, records, local_mode): (Arc<dyn OperationStore>, _, _) =
        match RestOperationStore::from_config(&config.store) {
            Some(result) => {
                let store: Arc<dyn OperationStore> =
                    Arc::new(result.map_err(BootstrapError::StoreClient)?);
                let records = store.list_all().await.map_err(BootstrapError::InitialLoad)?;
                info!(
                    event_name = "console.bootstrap.store_loaded",
                    records = records.len(),
                    "initial collection loaded from the remote store"
                );
                (store, records, false)
            }
            None => {
                info!(
                    event_name = "console.bootstrap.local_mode",
                    "store unconfigured; records will live only for this session"
                );
                (Arc::new(LocalOperationStore::new()), Vec::new(), true)
            }
        };

    let analysis: Option<Arc<dyn AnalysisEngine>> =
        match GeminiAnalysisEngine::from_config(&config.analysis) {
            Some(Ok(engine)) => Some(Arc::new(engine)),
            Some(Err(error)) => {
                warn!(
                    event_name = "console.bootstrap.analysis_unavailable",
                    error = %error,
                    "analysis client could not be created; continuing without it"
                );
                None
            }
            None => None,
        };

    let session = ConsoleSession::new(store, records, local_mode);
    Ok(Application { config, session, analysis })
}
