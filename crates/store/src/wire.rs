//! Field-name translation between the model convention (camelCase) and the
//! store convention (snake_case). The mapping is total and invertible for
//! every field in the operation shape, including the store-owned columns.

use serde_json::{Map, Value};

use gfv_core::{FIELDS, SYSTEM_FIELDS};

pub fn to_column(model_name: &str) -> Option<&'static str> {
    SYSTEM_FIELDS
        .iter()
        .find(|(model, _)| *model == model_name)
        .map(|(_, column)| *column)
        .or_else(|| {
            FIELDS.iter().find(|spec| spec.name == model_name).map(|spec| spec.column)
        })
}

pub fn to_model_name(column: &str) -> Option<&'static str> {
    SYSTEM_FIELDS
        .iter()
        .find(|(_, wire)| *wire == column)
        .map(|(model, _)| *model)
        .or_else(|| FIELDS.iter().find(|spec| spec.column == column).map(|spec| spec.name))
}

/// Rename every known key of a model-shaped object to its store column.
/// Unknown keys are dropped rather than leaked to the remote table.
pub fn object_to_wire(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(object.len());
    for (key, value) in object {
        if let Some(column) = to_column(key) {
            out.insert(column.to_string(), value.clone());
        }
    }
    out
}

/// Rename every known store column back to its model name. Unknown columns
/// (remote-side extras) are dropped.
pub fn object_to_model(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(object.len());
    for (key, value) in object {
        if let Some(name) = to_model_name(key) {
            out.insert(name.to_string(), value.clone());
        }
    }
    out
}
