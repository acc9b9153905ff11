use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use gfv_core::{Operation, OperationId, OperationPatch};

use crate::{OperationStore, StoreError};

/// Session-only fallback used when the remote store is unconfigured.
/// Ids are synthesized client-side; nothing survives the process.
#[derive(Default)]
pub struct LocalOperationStore {
    records: RwLock<Vec<Operation>>,
}

impl LocalOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationStore for LocalOperationStore {
    fn is_configured(&self) -> bool {
        false
    }

    async fn list_all(&self) -> Result<Vec<Operation>, StoreError> {
        let records = self.records.read().await;
        Ok(records.clone())
    }

    async fn insert(&self, mut draft: Operation) -> Result<Operation, StoreError> {
        draft.id = Some(OperationId(format!("local-{}", Uuid::new_v4())));
        draft.created_at = Some(Utc::now());

        let mut records = self.records.write().await;
        records.insert(0, draft.clone());
        Ok(draft)
    }

    async fn update(
        &self,
        id: &OperationId,
        patch: OperationPatch,
    ) -> Result<Operation, StoreError> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|record| record.id.as_ref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let updated =
            patch.apply_to(slot).map_err(|error| StoreError::Decode(error.to_string()))?;
        *slot = updated.clone();
        Ok(updated)
    }
}
