use serde_json::Value;

/// Semantic type of an operation field. Drives coercion, wire translation
/// and required-field checks uniformly instead of per-handler branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    SegmentTag,
    Choice,
    Integer,
    Date,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Model/API name (camelCase, as the views see it).
    pub name: &'static str,
    /// Column name at the store boundary (snake_case).
    pub column: &'static str,
    pub kind: FieldKind,
    /// Part of the canonical required set for an intake submission.
    pub required: bool,
    /// Financial value that must exceed zero for a valid submission.
    pub positive: bool,
}

const fn spec(
    name: &'static str,
    column: &'static str,
    kind: FieldKind,
    required: bool,
    positive: bool,
) -> FieldSpec {
    FieldSpec { name, column, kind, required, positive }
}

/// Every user-visible field of the operation record, in canonical order.
/// The required entries lead the table; missing-field messages list them
/// in this order.
pub const FIELDS: &[FieldSpec] = &[
    spec("destino", "destino", FieldKind::SegmentTag, true, false),
    spec("ci", "ci", FieldKind::Text, true, false),
    spec("cliente", "cliente", FieldKind::Text, true, false),
    spec("producto", "producto", FieldKind::Text, true, false),
    spec("analista", "analista", FieldKind::Text, true, false),
    spec("equipo", "equipo", FieldKind::Text, true, false),
    spec("agente", "agente", FieldKind::Text, true, false),
    spec("fechaAprobacion", "fecha_aprobacion", FieldKind::Date, true, false),
    spec("sucursal", "sucursal", FieldKind::Text, true, false),
    spec("impugnaciones", "impugnaciones", FieldKind::Text, false, false),
    spec("seguimiento", "seguimiento", FieldKind::Text, false, false),
    spec("inversor", "inversor", FieldKind::Text, false, false),
    spec("desembolsador", "desembolsador", FieldKind::Text, false, false),
    spec("experienciaSuc", "experiencia_suc", FieldKind::Text, false, false),
    spec("posibleDesembolso", "posible_desembolso", FieldKind::Text, false, false),
    spec("rebotes", "rebotes", FieldKind::Text, false, false),
    spec("motivo", "motivo", FieldKind::Text, false, false),
    spec("masOMenos", "mas_o_menos", FieldKind::Choice, false, false),
    spec("status", "status", FieldKind::Choice, false, false),
    spec("inversion", "inversion", FieldKind::Integer, false, true),
    spec("solicitud", "solicitud", FieldKind::Integer, false, true),
    spec("totalDevolver", "total_devolver", FieldKind::Integer, false, false),
    spec("pagare", "pagare", FieldKind::Integer, false, false),
    spec("utilidadAgente", "utilidad_agente", FieldKind::Integer, false, false),
    spec("utilidadGfv", "utilidad_gfv", FieldKind::Integer, false, false),
    spec("utilidadInversor", "utilidad_inversor", FieldKind::Integer, false, false),
    spec("cantidadBcp", "cantidad_bcp", FieldKind::Integer, false, false),
    spec("cantidadInformconf", "cantidad_informconf", FieldKind::Integer, false, false),
    spec("montoDado", "monto_dado", FieldKind::Integer, false, false),
];

/// System columns owned by the store: present at the wire boundary but
/// never part of an updatable payload.
pub const SYSTEM_FIELDS: &[(&str, &str)] = &[("id", "id"), ("createdAt", "created_at")];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

pub fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.iter().any(|(model, _)| *model == name)
}

/// Coerce arbitrary JSON into a monetary integer. Malformed input floors
/// to 0; fractional amounts truncate (the currency has no subunits).
pub fn coerce_money(value: &Value) -> i64 {
    match value {
        Value::Number(number) => {
            number.as_i64().or_else(|| number.as_f64().map(|float| float as i64)).unwrap_or(0)
        }
        Value::String(raw) => coerce_money_text(raw),
        _ => 0,
    }
}

pub fn coerce_money_text(raw: &str) -> i64 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|float| float as i64))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::{coerce_money, coerce_money_text, field, FieldKind, FIELDS, SYSTEM_FIELDS};

    #[test]
    fn required_fields_lead_the_table_in_canonical_order() {
        let required: Vec<&str> =
            FIELDS.iter().filter(|spec| spec.required).map(|spec| spec.name).collect();
        assert_eq!(
            required,
            vec![
                "destino",
                "ci",
                "cliente",
                "producto",
                "analista",
                "equipo",
                "agente",
                "fechaAprobacion",
                "sucursal"
            ]
        );
    }

    #[test]
    fn model_names_and_columns_are_unique() {
        let mut names = HashSet::new();
        let mut columns = HashSet::new();
        for spec in FIELDS {
            assert!(names.insert(spec.name), "duplicate model name {}", spec.name);
            assert!(columns.insert(spec.column), "duplicate column {}", spec.column);
        }
        for (model, column) in SYSTEM_FIELDS {
            assert!(names.insert(*model), "system field collides with {model}");
            assert!(columns.insert(*column), "system column collides with {column}");
        }
    }

    #[test]
    fn only_inversion_and_solicitud_carry_the_positive_rule() {
        let positive: Vec<&str> =
            FIELDS.iter().filter(|spec| spec.positive).map(|spec| spec.name).collect();
        assert_eq!(positive, vec!["inversion", "solicitud"]);
        for spec in FIELDS.iter().filter(|spec| spec.positive) {
            assert_eq!(spec.kind, FieldKind::Integer);
        }
    }

    #[test]
    fn money_coercion_floors_malformed_input_to_zero() {
        assert_eq!(coerce_money_text("25000000"), 25_000_000);
        assert_eq!(coerce_money_text("  1200000 "), 1_200_000);
        assert_eq!(coerce_money_text("1000.75"), 1000);
        assert_eq!(coerce_money_text("abc"), 0);
        assert_eq!(coerce_money_text(""), 0);
        assert_eq!(coerce_money(&json!(3_000_000)), 3_000_000);
        assert_eq!(coerce_money(&json!("no es numero")), 0);
        assert_eq!(coerce_money(&json!(null)), 0);
        assert_eq!(coerce_money(&json!(true)), 0);
    }

    #[test]
    fn lookup_resolves_model_names_only() {
        assert!(field("fechaAprobacion").is_some());
        assert!(field("fecha_aprobacion").is_none());
        assert!(field("id").is_none());
    }
}
