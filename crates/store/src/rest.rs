use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use tracing::warn;

use gfv_core::config::StoreConfig;
use gfv_core::{Operation, OperationId, OperationPatch};

use crate::wire;
use crate::{OperationStore, StoreError};

/// Remote table store speaking the PostgREST dialect: one `operaciones`
/// table, list ordered by `created_at.desc`, insert/update returning the
/// representation. The access key travels as both `apikey` and bearer.
pub struct RestOperationStore {
    client: reqwest::Client,
    base_url: String,
    table: String,
    anon_key: SecretString,
}

impl RestOperationStore {
    pub fn new(
        url: &str,
        anon_key: SecretString,
        table: &str,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            anon_key,
        })
    }

    /// `None` when the configuration selects local-fallback mode.
    pub fn from_config(config: &StoreConfig) -> Option<Result<Self, StoreError>> {
        if !config.is_configured() {
            return None;
        }
        let url = config.url.clone()?;
        let anon_key = config.anon_key.clone()?;
        Some(Self::new(&url, anon_key, &config.table, config.timeout_secs))
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.anon_key.expose_secret())
    }

    async fn read_body(response: Response) -> Result<Value, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "store.request_rejected",
                status = status.as_u16(),
                "remote store rejected a request"
            );
            return Err(StoreError::Rejected { status: status.as_u16(), body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| StoreError::Decode(error.to_string()))
    }
}

#[async_trait]
impl OperationStore for RestOperationStore {
    fn is_configured(&self) -> bool {
        true
    }

    async fn list_all(&self) -> Result<Vec<Operation>, StoreError> {
        let response = self
            .request(Method::GET, &self.endpoint())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        decode_rows(&Self::read_body(response).await?)
    }

    async fn insert(&self, draft: Operation) -> Result<Operation, StoreError> {
        let payload = insert_payload(&draft)?;
        let response = self
            .request(Method::POST, &self.endpoint())
            .header("Prefer", "return=representation")
            .json(&json!([payload]))
            .send()
            .await?;

        let rows = decode_rows(&Self::read_body(response).await?)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        id: &OperationId,
        patch: OperationPatch,
    ) -> Result<Operation, StoreError> {
        let payload = update_payload(&patch);
        if payload.is_empty() {
            return Err(StoreError::Decode("update payload is empty".to_string()));
        }

        let response = self
            .request(Method::PATCH, &self.endpoint())
            .query(&[("id", format!("eq.{id}").as_str())])
            .header("Prefer", "return=representation")
            .json(&Value::Object(payload))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let rows = decode_rows(&Self::read_body(response).await?)?;
        rows.into_iter().next().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Model draft → wire row. The id and creation timestamp never travel
/// outward; the store owns both.
fn insert_payload(draft: &Operation) -> Result<Map<String, Value>, StoreError> {
    let mut object = match serde_json::to_value(draft) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            return Err(StoreError::Decode("operation did not serialize to an object".to_string()))
        }
    };
    object.remove("id");
    object.remove("createdAt");
    Ok(wire::object_to_wire(&object))
}

/// Patch changes (model names) → wire columns. `OperationPatch` already
/// refuses id/createdAt, so the payload is always safe to send.
fn update_payload(patch: &OperationPatch) -> Map<String, Value> {
    let mut object = Map::with_capacity(patch.len());
    for (name, value) in patch.changes() {
        object.insert(name.clone(), value.clone());
    }
    wire::object_to_wire(&object)
}

fn decode_rows(body: &Value) -> Result<Vec<Operation>, StoreError> {
    let rows = body
        .as_array()
        .ok_or_else(|| StoreError::Decode("expected a JSON array of rows".to_string()))?;

    rows.iter()
        .map(|row| {
            let object = row
                .as_object()
                .ok_or_else(|| StoreError::Decode("expected a JSON row object".to_string()))?;
            let model = Value::Object(wire::object_to_model(object));
            serde_json::from_value::<Operation>(model)
                .map_err(|error| StoreError::Decode(error.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use gfv_core::{Operation, OperationId, OperationPatch, Segment};

    use super::{decode_rows, insert_payload, update_payload, RestOperationStore};

    #[test]
    fn endpoint_joins_base_url_and_table() {
        let store = RestOperationStore::new(
            "https://tenant.example.co/",
            SecretString::from("anon".to_string()),
            "operaciones",
            30,
        )
        .expect("client build");
        assert_eq!(store.endpoint(), "https://tenant.example.co/rest/v1/operaciones");
    }

    #[test]
    fn insert_payload_strips_identity_and_uses_wire_columns() {
        let mut draft = Operation::default();
        draft.id = Some(OperationId("should-not-travel".to_string()));
        draft.destino = Some(Segment::IntegraCapital);
        draft.cliente = "TEST USER".to_string();
        draft.fecha_aprobacion = "2024-01-01".to_string();
        draft.inversion = 1_000_000;

        let payload = insert_payload(&draft).expect("payload");

        assert!(!payload.contains_key("id"));
        assert!(!payload.contains_key("created_at"));
        assert_eq!(payload.get("fecha_aprobacion"), Some(&json!("2024-01-01")));
        assert_eq!(payload.get("destino"), Some(&json!("INTEGRA CAPITAL")));
        assert_eq!(payload.get("inversion"), Some(&json!(1_000_000)));
        assert!(!payload.contains_key("fechaAprobacion"));
    }

    #[test]
    fn update_payload_renames_patch_keys_to_columns() {
        let mut patch = OperationPatch::new();
        patch.set("cantidadBcp", "3").expect("set");
        patch.set("motivo", "DESEMBOLSADO").expect("set");

        let payload = update_payload(&patch);
        assert_eq!(payload.get("cantidad_bcp"), Some(&json!(3)));
        assert_eq!(payload.get("motivo"), Some(&json!("DESEMBOLSADO")));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn rows_decode_from_the_wire_convention() {
        let body = json!([{
            "id": "9f0c",
            "destino": "COMERCIAL 1",
            "cliente": "MARIN BARBOZA, ROBERTO",
            "fecha_aprobacion": "2024-05-10",
            "cantidad_bcp": 2,
            "created_at": "2024-05-10T12:00:00Z",
        }]);

        let rows = decode_rows(&body).expect("decode");
        assert_eq!(rows.len(), 1);
        let operation = &rows[0];
        assert_eq!(operation.id.as_ref().map(|id| id.0.as_str()), Some("9f0c"));
        assert_eq!(operation.fecha_aprobacion, "2024-05-10");
        assert_eq!(operation.cantidad_bcp, 2);
        assert!(operation.created_at.is_some());
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        assert!(decode_rows(&json!({"not": "an array"})).is_err());
        assert!(decode_rows(&json!([42])).is_err());
    }
}
