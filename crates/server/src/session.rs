use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use gfv_core::{
    validate, DomainError, Operation, OperationId, OperationPatch, Panel, Segment,
    ValidationFailure, ValidationResult,
};
use gfv_store::{OperationStore, StoreError};

/// Header figures for one segment list: portfolio size, records already in
/// BCP, and distinct branches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub cartera_total: usize,
    pub en_bcp: usize,
    pub sucursales: usize,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(ValidationFailure),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unknown operation `{0}`")]
    UnknownRecord(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exclusive owner of the in-memory collection and the active panel.
/// Every mutation flows through `submit`/`apply_update`; a failed store
/// call leaves both the collection and the panel untouched.
pub struct ConsoleSession {
    store: Arc<dyn OperationStore>,
    records: Vec<Operation>,
    active: Panel,
    local_mode: bool,
}

impl ConsoleSession {
    /// `records` come from the store's initial load, newest first. The
    /// session always starts on the intake panel.
    pub fn new(store: Arc<dyn OperationStore>, records: Vec<Operation>, local_mode: bool) -> Self {
        Self { store, records, active: Panel::Carga, local_mode }
    }

    pub fn records(&self) -> &[Operation] {
        &self.records
    }

    pub fn active_panel(&self) -> Panel {
        self.active
    }

    pub fn set_active_panel(&mut self, panel: Panel) {
        self.active = panel;
    }

    pub fn local_mode(&self) -> bool {
        self.local_mode
    }

    /// Records routed to one segment, newest first.
    pub fn segment_view(&self, segment: Segment) -> Vec<&Operation> {
        self.records.iter().filter(|record| record.destino == Some(segment)).collect()
    }

    /// Case-insensitive search over cliente/analista; CI matches verbatim.
    pub fn search(&self, segment: Segment, term: &str) -> Vec<&Operation> {
        let needle = term.to_lowercase();
        self.segment_view(segment)
            .into_iter()
            .filter(|record| {
                record.cliente.to_lowercase().contains(&needle)
                    || record.ci.contains(term)
                    || record.analista.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn segment_stats(&self, segment: Segment) -> SegmentStats {
        let view = self.segment_view(segment);
        let en_bcp = view.iter().filter(|record| record.cantidad_bcp > 0).count();
        let sucursales: HashSet<&str> =
            view.iter().map(|record| record.sucursal.as_str()).collect();
        SegmentStats { cartera_total: view.len(), en_bcp, sucursales: sucursales.len() }
    }

    /// Validate, persist, then prepend and route to the draft's segment.
    /// No state changes on validation or store failure.
    pub async fn submit(&mut self, draft: Operation) -> Result<Operation, SubmitError> {
        if let ValidationResult::Invalid(failure) = validate(&draft) {
            return Err(SubmitError::Validation(failure));
        }

        let persisted = self.store.insert(draft).await?;
        self.records.insert(0, persisted.clone());
        if let Some(segment) = persisted.destino {
            self.active = Panel::Segmento(segment);
        }
        Ok(persisted)
    }

    /// Commit one accumulated patch; on success the store's authoritative
    /// record replaces the matching entry. An empty patch is a no-op.
    pub async fn apply_update(
        &mut self,
        id: &OperationId,
        patch: OperationPatch,
    ) -> Result<Operation, UpdateError> {
        let position = self
            .records
            .iter()
            .position(|record| record.id.as_ref() == Some(id))
            .ok_or_else(|| UpdateError::UnknownRecord(id.to_string()))?;

        if patch.is_empty() {
            return Ok(self.records[position].clone());
        }

        let authoritative = self.store.update(id, patch).await?;
        self.records[position] = authoritative.clone();
        Ok(authoritative)
    }
}

/// One detail-editor interaction: field changes accumulate here and commit
/// as a single partial payload, instead of one store call per keystroke.
#[derive(Clone, Debug)]
pub struct EditSession {
    id: OperationId,
    patch: OperationPatch,
}

impl EditSession {
    pub fn new(id: OperationId) -> Self {
        Self { id, patch: OperationPatch::new() }
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }

    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), DomainError> {
        self.patch.set(field, raw)
    }

    pub fn set_value(&mut self, field: &str, value: Value) -> Result<(), DomainError> {
        self.patch.set_value(field, value)
    }

    pub fn into_patch(self) -> (OperationId, OperationPatch) {
        (self.id, self.patch)
    }
}
