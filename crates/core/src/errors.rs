use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{0}` is not editable")]
    ImmutableField(String),
    #[error("invalid value `{value}` for field `{field}`")]
    InvalidFieldValue { field: String, value: String },
    #[error("unknown segment `{0}`")]
    UnknownSegment(String),
    #[error("patch could not be applied: {0}")]
    Patch(String),
}
