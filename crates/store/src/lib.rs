pub mod local;
pub mod rest;
pub mod wire;

use async_trait::async_trait;
use thiserror::Error;

use gfv_core::{Operation, OperationId, OperationPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("store response could not be decoded: {0}")]
    Decode(String),
    #[error("record `{0}` was not found in the store")]
    NotFound(String),
}

pub use local::LocalOperationStore;
pub use rest::RestOperationStore;

/// Abstract record store for operations. One logical table keyed by id.
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Whether a remote service backs this store. Local fallback reports
    /// `false` so the console can surface its degraded mode.
    fn is_configured(&self) -> bool;

    /// Every operation, ordered by creation time descending.
    async fn list_all(&self) -> Result<Vec<Operation>, StoreError>;

    /// Persist a draft and return it with its assigned id.
    async fn insert(&self, draft: Operation) -> Result<Operation, StoreError>;

    /// Apply a partial update; unspecified fields keep their stored values.
    /// Returns the authoritative post-update record.
    async fn update(
        &self,
        id: &OperationId,
        patch: OperationPatch,
    ) -> Result<Operation, StoreError>;
}
