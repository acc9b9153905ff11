//! Advisory risk analysis for one operation.
//!
//! The engine is strictly advisory: it never decides whether an operation
//! is persisted, and every failure mode (transport, timeout, malformed
//! response, missing configuration) degrades to `AnalysisUnavailable`.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gfv_core::Operation;

pub use gemini::GeminiAnalysisEngine;

/// Structured advisory summary returned by the generative endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub resumen: String,
    pub riesgos: Vec<String>,
    pub recomendaciones: Vec<String>,
    #[serde(rename = "scoreRiesgo")]
    pub score_riesgo: f64,
}

impl Analysis {
    /// Shape contract: a score on the 0..=10 scale and at least one
    /// recommendation. Anything else is treated as unavailable.
    pub fn conforms(&self) -> bool {
        (0.0..=10.0).contains(&self.score_riesgo) && !self.recomendaciones.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AnalysisUnavailable {
    #[error("analysis service is not configured")]
    NotConfigured,
    #[error("analysis request failed: {0}")]
    Transport(String),
    #[error("analysis response was malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn analyze(&self, operation: &Operation) -> Result<Analysis, AnalysisUnavailable>;
}

#[cfg(test)]
mod tests {
    use super::Analysis;

    fn analysis(score: f64, recomendaciones: Vec<String>) -> Analysis {
        Analysis {
            resumen: "Operación de riesgo moderado.".to_string(),
            riesgos: vec!["Monto solicitado supera la inversión.".to_string()],
            recomendaciones,
            score_riesgo: score,
        }
    }

    #[test]
    fn shape_contract_bounds_the_score() {
        assert!(analysis(0.0, vec!["Seguimiento semanal.".to_string()]).conforms());
        assert!(analysis(10.0, vec!["Seguimiento semanal.".to_string()]).conforms());
        assert!(!analysis(10.5, vec!["Seguimiento semanal.".to_string()]).conforms());
        assert!(!analysis(-1.0, vec!["Seguimiento semanal.".to_string()]).conforms());
    }

    #[test]
    fn shape_contract_requires_recommendations() {
        assert!(!analysis(5.0, Vec::new()).conforms());
    }
}
