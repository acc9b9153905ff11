use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::fields::{self, FieldKind};
use crate::domain::operation::{MasOMenos, Operation, TrackingStatus};
use crate::domain::segment::Segment;
use crate::errors::DomainError;

/// Accumulated partial update for one operation. Values are coerced through
/// the field table on entry, so a patch always carries store-ready typed
/// values. `id` and `createdAt` are rejected outright.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OperationPatch {
    changes: BTreeMap<String, Value>,
}

impl OperationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &BTreeMap<String, Value> {
        &self.changes
    }

    /// Record one field change from raw text input.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), DomainError> {
        self.set_value(name, Value::String(raw.to_string()))
    }

    /// Record one field change from an arbitrary JSON value.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), DomainError> {
        if fields::is_system_field(name) {
            return Err(DomainError::ImmutableField(name.to_string()));
        }
        let spec = fields::field(name).ok_or_else(|| DomainError::UnknownField(name.to_string()))?;

        let coerced = match spec.kind {
            FieldKind::Integer => Value::from(fields::coerce_money(&value)),
            FieldKind::Text | FieldKind::Date => Value::String(as_text(&value)),
            FieldKind::SegmentTag => {
                let raw = as_text(&value);
                let segment = Segment::parse(&raw).ok_or(DomainError::UnknownSegment(raw))?;
                Value::String(segment.as_str().to_string())
            }
            FieldKind::Choice => coerce_choice(spec.name, &value)?,
        };

        self.changes.insert(name.to_string(), coerced);
        Ok(())
    }

    /// Overlay this patch on a record, leaving every untouched field exactly
    /// as it was.
    pub fn apply_to(&self, operation: &Operation) -> Result<Operation, DomainError> {
        let mut map = match serde_json::to_value(operation) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(DomainError::Patch("operation did not serialize to an object".into()))
            }
        };
        for (name, value) in &self.changes {
            map.insert(name.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(map))
            .map_err(|error| DomainError::Patch(error.to_string()))
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn coerce_choice(name: &str, value: &Value) -> Result<Value, DomainError> {
    let raw = as_text(value);
    match name {
        "masOMenos" => MasOMenos::parse(&raw)
            .map(|choice| Value::String(choice.as_str().to_string()))
            .ok_or_else(|| DomainError::InvalidFieldValue {
                field: name.to_string(),
                value: raw,
            }),
        "status" if raw.trim().is_empty() => Ok(Value::Null),
        "status" => TrackingStatus::parse(&raw)
            .map(|status| Value::String(status.as_str().to_string()))
            .ok_or_else(|| DomainError::InvalidFieldValue {
                field: name.to_string(),
                value: raw,
            }),
        _ => Err(DomainError::InvalidFieldValue { field: name.to_string(), value: raw }),
    }
}
