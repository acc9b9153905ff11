use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::fields::{self, FieldSpec};
use crate::domain::segment::Segment;

/// Opaque record identifier. Assigned by the store (or synthesized locally
/// in fallback mode) on creation; never supplied by the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub String);

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a disbursement relative to the requested amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MasOMenos {
    Mas,
    Menos,
    #[default]
    Igual,
}

impl MasOMenos {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "MAS" | "MÁS" => Some(Self::Mas),
            "MENOS" => Some(Self::Menos),
            "IGUAL" => Some(Self::Igual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mas => "MAS",
            Self::Menos => "MENOS",
            Self::Igual => "IGUAL",
        }
    }
}

/// Reserved derived tag; no current workflow populates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackingStatus {
    Completo,
    Pendiente,
    Observado,
}

impl TrackingStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "COMPLETO" => Some(Self::Completo),
            "PENDIENTE" => Some(Self::Pendiente),
            "OBSERVADO" => Some(Self::Observado),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completo => "COMPLETO",
            Self::Pendiente => "PENDIENTE",
            Self::Observado => "OBSERVADO",
        }
    }
}

/// The sole entity of the console: one loan/investment deal under tracking.
///
/// Model JSON uses the camelCase convention of the views; the snake_case
/// store convention is the store adapter's concern. Monetary fields carry
/// whole guaraníes and coerce malformed input to 0 at deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<OperationId>,
    #[serde(deserialize_with = "lenient_segment")]
    pub destino: Option<Segment>,
    pub ci: String,
    pub cliente: String,
    pub producto: String,
    pub analista: String,
    pub equipo: String,
    pub agente: String,
    pub fecha_aprobacion: String,
    pub sucursal: String,
    pub impugnaciones: String,
    pub seguimiento: String,
    pub inversor: String,
    pub desembolsador: String,
    pub experiencia_suc: String,
    pub posible_desembolso: String,
    pub rebotes: String,
    pub motivo: String,
    pub mas_o_menos: MasOMenos,
    pub status: Option<TrackingStatus>,
    #[serde(deserialize_with = "lenient_money")]
    pub inversion: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub solicitud: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub total_devolver: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub pagare: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub utilidad_agente: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub utilidad_gfv: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub utilidad_inversor: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub cantidad_bcp: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub cantidad_informconf: i64,
    #[serde(deserialize_with = "lenient_money")]
    pub monto_dado: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            id: None,
            destino: None,
            ci: String::new(),
            cliente: String::new(),
            producto: String::new(),
            analista: String::new(),
            equipo: String::new(),
            agente: String::new(),
            fecha_aprobacion: String::new(),
            sucursal: "MATRIZ".to_string(),
            impugnaciones: String::new(),
            seguimiento: String::new(),
            inversor: String::new(),
            desembolsador: String::new(),
            experiencia_suc: String::new(),
            posible_desembolso: String::new(),
            rebotes: String::new(),
            motivo: String::new(),
            mas_o_menos: MasOMenos::Igual,
            status: None,
            inversion: 0,
            solicitud: 0,
            total_devolver: 0,
            pagare: 0,
            utilidad_agente: 0,
            utilidad_gfv: 0,
            utilidad_inversor: 0,
            cantidad_bcp: 0,
            cantidad_informconf: 0,
            monto_dado: 0,
            created_at: None,
        }
    }
}

impl Operation {
    /// Monetary value by model field name; `None` for non-monetary fields.
    pub fn money(&self, name: &str) -> Option<i64> {
        match name {
            "inversion" => Some(self.inversion),
            "solicitud" => Some(self.solicitud),
            "totalDevolver" => Some(self.total_devolver),
            "pagare" => Some(self.pagare),
            "utilidadAgente" => Some(self.utilidad_agente),
            "utilidadGfv" => Some(self.utilidad_gfv),
            "utilidadInversor" => Some(self.utilidad_inversor),
            "cantidadBcp" => Some(self.cantidad_bcp),
            "cantidadInformconf" => Some(self.cantidad_informconf),
            "montoDado" => Some(self.monto_dado),
            _ => None,
        }
    }

    /// Whether a field counts as unset for required-field purposes.
    /// Monetary fields use `<= 0`, never string falsiness.
    pub fn field_is_empty(&self, spec: &FieldSpec) -> bool {
        match spec.name {
            "destino" => self.destino.is_none(),
            "ci" => self.ci.trim().is_empty(),
            "cliente" => self.cliente.trim().is_empty(),
            "producto" => self.producto.trim().is_empty(),
            "analista" => self.analista.trim().is_empty(),
            "equipo" => self.equipo.trim().is_empty(),
            "agente" => self.agente.trim().is_empty(),
            "fechaAprobacion" => self.fecha_aprobacion.trim().is_empty(),
            "sucursal" => self.sucursal.trim().is_empty(),
            "impugnaciones" => self.impugnaciones.trim().is_empty(),
            "seguimiento" => self.seguimiento.trim().is_empty(),
            "inversor" => self.inversor.trim().is_empty(),
            "desembolsador" => self.desembolsador.trim().is_empty(),
            "experienciaSuc" => self.experiencia_suc.trim().is_empty(),
            "posibleDesembolso" => self.posible_desembolso.trim().is_empty(),
            "rebotes" => self.rebotes.trim().is_empty(),
            "motivo" => self.motivo.trim().is_empty(),
            "masOMenos" => false,
            "status" => self.status.is_none(),
            other => match self.money(other) {
                Some(value) => value <= 0,
                None => true,
            },
        }
    }
}

fn lenient_segment<'de, D>(deserializer: D) -> Result<Option<Segment>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(tag) => Segment::parse(tag)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown segment `{tag}`"))),
    }
}

fn lenient_money<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(fields::coerce_money(&value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::fields::FIELDS;
    use crate::domain::segment::Segment;

    use super::{MasOMenos, Operation};

    #[test]
    fn empty_operation_uses_documented_defaults() {
        let operation = Operation::default();
        assert_eq!(operation.sucursal, "MATRIZ");
        assert_eq!(operation.mas_o_menos, MasOMenos::Igual);
        assert_eq!(operation.inversion, 0);
        assert!(operation.id.is_none());
        assert!(operation.destino.is_none());
        assert!(operation.status.is_none());
    }

    #[test]
    fn monetary_fields_coerce_malformed_text_to_zero() {
        let operation: Operation = serde_json::from_value(json!({
            "destino": "COMERCIAL 1",
            "cliente": "TEST USER",
            "inversion": "no es numero",
            "solicitud": "1200000",
            "pagare": 1000.9,
        }))
        .expect("lenient draft decode");

        assert_eq!(operation.inversion, 0);
        assert_eq!(operation.solicitud, 1_200_000);
        assert_eq!(operation.pagare, 1000);
        assert_eq!(operation.total_devolver, 0);
    }

    #[test]
    fn blank_destino_decodes_as_unrouted() {
        let operation: Operation =
            serde_json::from_value(json!({ "destino": "", "cliente": "X" })).expect("decode");
        assert!(operation.destino.is_none());

        let error = serde_json::from_value::<Operation>(json!({ "destino": "COMERCIAL 9" }));
        assert!(error.is_err());
    }

    #[test]
    fn model_json_uses_camel_case_keys() {
        let mut operation = Operation::default();
        operation.destino = Some(Segment::Comercial1);
        operation.fecha_aprobacion = "2024-05-10".to_string();
        let value = serde_json::to_value(&operation).expect("serialize");
        let map = value.as_object().expect("object");

        assert!(map.contains_key("fechaAprobacion"));
        assert!(map.contains_key("utilidadGfv"));
        assert!(map.contains_key("cantidadBcp"));
        assert!(!map.contains_key("fecha_aprobacion"));
        // id is absent until the store assigns one
        assert!(!map.contains_key("id"));
    }

    #[test]
    fn every_declared_field_resolves_on_a_populated_record() {
        let operation: Operation = serde_json::from_value(json!({
            "destino": "COMERCIAL 1",
            "ci": "2.375.630",
            "cliente": "MARIN BARBOZA, ROBERTO",
            "producto": "CRÉDITO",
            "analista": "CARLOS GARAY",
            "equipo": "EQ1",
            "agente": "MIGUEL GONZALEZ",
            "fechaAprobacion": "2024-05-10",
            "sucursal": "MATRIZ",
            "impugnaciones": "0",
            "seguimiento": "Primer contacto realizado.",
            "inversor": "CARLOS DIAZ",
            "desembolsador": "MESA 2",
            "experienciaSuc": "BUENA",
            "posibleDesembolso": "SI",
            "rebotes": "1",
            "motivo": "APROBADO",
            "masOMenos": "MAS",
            "status": "PENDIENTE",
            "inversion": 25_000_000,
            "solicitud": 30_000_000,
            "totalDevolver": 35_000_000,
            "pagare": 35_000_000,
            "utilidadAgente": 2_000_000,
            "utilidadGfv": 3_000_000,
            "utilidadInversor": 1_500_000,
            "cantidadBcp": 2,
            "cantidadInformconf": 2,
            "montoDado": 28_000_000,
        }))
        .expect("full record decode");

        // A misnamed arm in field_is_empty would fall through to `true` here.
        for spec in FIELDS {
            assert!(
                !operation.field_is_empty(spec),
                "field {} unexpectedly reported empty",
                spec.name
            );
        }
    }
}
