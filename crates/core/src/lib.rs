pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use domain::fields::{
    coerce_money, coerce_money_text, field, FieldKind, FieldSpec, FIELDS, SYSTEM_FIELDS,
};
pub use domain::operation::{MasOMenos, Operation, OperationId, TrackingStatus};
pub use domain::patch::OperationPatch;
pub use domain::segment::{Panel, Segment};
pub use errors::DomainError;
pub use validation::{validate, ValidationFailure, ValidationResult};
