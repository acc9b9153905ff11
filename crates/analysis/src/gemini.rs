use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::warn;

use gfv_core::config::AnalysisConfig;
use gfv_core::Operation;

use crate::{Analysis, AnalysisEngine, AnalysisUnavailable};

const GENERATE_CONTENT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini `generateContent` endpoint, constrained to return
/// JSON matching the `Analysis` shape. One attempt per call, no retry.
pub struct GeminiAnalysisEngine {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl GeminiAnalysisEngine {
    pub fn new(
        api_key: SecretString,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AnalysisUnavailable> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|error| AnalysisUnavailable::Transport(error.to_string()))?;

        Ok(Self { client, api_key, model: model.to_string() })
    }

    /// `None` when no API key is configured; analysis stays unavailable.
    pub fn from_config(config: &AnalysisConfig) -> Option<Result<Self, AnalysisUnavailable>> {
        if !config.is_configured() {
            return None;
        }
        let api_key = config.api_key.clone()?;
        Some(Self::new(api_key, &config.model, config.timeout_secs))
    }

    fn endpoint(&self) -> String {
        format!("{GENERATE_CONTENT_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl AnalysisEngine for GeminiAnalysisEngine {
    async fn analyze(&self, operation: &Operation) -> Result<Analysis, AnalysisUnavailable> {
        let body = request_body(&prompt(operation));

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                warn!(event_name = "analysis.request_failed", "analysis request failed");
                AnalysisUnavailable::Transport(error.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "analysis.request_rejected",
                status = status.as_u16(),
                "analysis endpoint rejected the request"
            );
            return Err(AnalysisUnavailable::Transport(format!("status {status}")));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|error| AnalysisUnavailable::Malformed(error.to_string()))?;

        parse_response(&payload)
    }
}

/// Natural-language rendering of the operation's key financial fields,
/// as the views describe them.
fn prompt(operation: &Operation) -> String {
    format!(
        "Analiza los siguientes datos financieros de una operación y proporciona \
         un resumen ejecutivo, identificando riesgos potenciales y sugerencias de \
         seguimiento.\n\n\
         Datos de la Operación:\n\
         - Cliente: {}\n\
         - Producto: {}\n\
         - Inversión: Gs. {}\n\
         - Solicitud: Gs. {}\n\
         - Total a Devolver: Gs. {}\n\
         - Utilidad GFV: Gs. {}\n\
         - Utilidad Agente: Gs. {}\n\
         - Utilidad Inversor: Gs. {}\n\
         - Seguimiento actual: {}\n\n\
         Responde en formato JSON estructurado.",
        operation.cliente,
        operation.producto,
        format_gs(operation.inversion),
        format_gs(operation.solicitud),
        format_gs(operation.total_devolver),
        format_gs(operation.utilidad_gfv),
        format_gs(operation.utilidad_agente),
        format_gs(operation.utilidad_inversor),
        operation.seguimiento,
    )
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "resumen": { "type": "STRING" },
                    "riesgos": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "recomendaciones": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "scoreRiesgo": { "type": "NUMBER", "description": "Del 1 al 10" }
                },
                "required": ["resumen", "riesgos", "recomendaciones", "scoreRiesgo"]
            }
        }
    })
}

/// Extract and validate the structured analysis from a generateContent
/// response. Any deviation from the contract is `Malformed`.
fn parse_response(payload: &Value) -> Result<Analysis, AnalysisUnavailable> {
    let text = payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AnalysisUnavailable::Malformed("response carried no candidate text".to_string())
        })?;

    let analysis: Analysis = serde_json::from_str(text)
        .map_err(|error| AnalysisUnavailable::Malformed(error.to_string()))?;

    if !analysis.conforms() {
        return Err(AnalysisUnavailable::Malformed(
            "analysis violated the shape contract".to_string(),
        ));
    }

    Ok(analysis)
}

/// Guaraní amounts print with dot thousands separators and no subunits.
fn format_gs(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use gfv_core::Operation;

    use crate::AnalysisUnavailable;

    use super::{format_gs, parse_response, prompt, request_body};

    fn operation() -> Operation {
        let mut operation = Operation::default();
        operation.cliente = "MARIN BARBOZA, ROBERTO".to_string();
        operation.producto = "CRÉDITO".to_string();
        operation.inversion = 25_000_000;
        operation.solicitud = 30_000_000;
        operation.seguimiento = "Primer contacto realizado.".to_string();
        operation
    }

    #[test]
    fn guarani_amounts_group_thousands_with_dots() {
        assert_eq!(format_gs(0), "0");
        assert_eq!(format_gs(1_500), "1.500");
        assert_eq!(format_gs(25_000_000), "25.000.000");
        assert_eq!(format_gs(-42_000), "-42.000");
    }

    #[test]
    fn prompt_renders_the_key_fields() {
        let rendered = prompt(&operation());
        assert!(rendered.contains("Cliente: MARIN BARBOZA, ROBERTO"));
        assert!(rendered.contains("Inversión: Gs. 25.000.000"));
        assert!(rendered.contains("Solicitud: Gs. 30.000.000"));
        assert!(rendered.contains("Seguimiento actual: Primer contacto realizado."));
    }

    #[test]
    fn request_constrains_the_response_to_json() {
        let body = request_body("hola");
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType").and_then(|v| v.as_str()),
            Some("application/json")
        );
        assert!(body.pointer("/generationConfig/responseSchema/required").is_some());
    }

    #[test]
    fn well_formed_responses_parse() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": r#"{
                    "resumen": "Operación sólida.",
                    "riesgos": ["Plazo ajustado."],
                    "recomendaciones": ["Verificar pagaré."],
                    "scoreRiesgo": 4
                }"# }] }
            }]
        });

        let analysis = parse_response(&payload).expect("parse");
        assert_eq!(analysis.resumen, "Operación sólida.");
        assert_eq!(analysis.score_riesgo, 4.0);
    }

    #[test]
    fn contract_violations_are_malformed() {
        let missing_text = json!({ "candidates": [] });
        assert!(matches!(
            parse_response(&missing_text),
            Err(AnalysisUnavailable::Malformed(_))
        ));

        let bad_json = json!({
            "candidates": [{ "content": { "parts": [{ "text": "no es json" }] } }]
        });
        assert!(matches!(parse_response(&bad_json), Err(AnalysisUnavailable::Malformed(_))));

        let out_of_range = json!({
            "candidates": [{ "content": { "parts": [{ "text": r#"{
                "resumen": "x",
                "riesgos": [],
                "recomendaciones": ["y"],
                "scoreRiesgo": 14
            }"# }] } }]
        });
        assert!(matches!(parse_response(&out_of_range), Err(AnalysisUnavailable::Malformed(_))));

        let no_recommendations = json!({
            "candidates": [{ "content": { "parts": [{ "text": r#"{
                "resumen": "x",
                "riesgos": [],
                "recomendaciones": [],
                "scoreRiesgo": 5
            }"# }] } }]
        });
        assert!(matches!(
            parse_response(&no_recommendations),
            Err(AnalysisUnavailable::Malformed(_))
        ));
    }
}
