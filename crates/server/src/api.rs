//! JSON surface consumed by the console views.
//!
//! - `GET   /health`                  — liveness
//! - `GET   /api/estado`              — operating mode, active panel, counts
//! - `POST  /api/panel`               — switch the active panel
//! - `GET   /api/segmentos/{tag}`     — segment view + stats (`?q=` searches)
//! - `POST  /api/operaciones`         — submit a draft (analysis is advisory)
//! - `PATCH /api/operaciones/{id}`    — commit an accumulated edit patch

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{info, warn};

use gfv_analysis::{Analysis, AnalysisEngine};
use gfv_core::{Operation, OperationId, OperationPatch, Panel, Segment};

use crate::session::{ConsoleSession, SegmentStats, SubmitError, UpdateError};

#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<RwLock<ConsoleSession>>,
    pub analysis: Option<Arc<dyn AnalysisEngine>>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/estado", get(estado))
        .route("/api/panel", post(set_panel))
        .route("/api/segmentos/{tag}", get(segmento))
        .route("/api/operaciones", post(submit))
        .route("/api/operaciones/{id}", patch(update))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EstadoResponse {
    modo_local: bool,
    panel_activo: Panel,
    total_operaciones: usize,
}

#[derive(Debug, Deserialize)]
struct PanelRequest {
    panel: String,
}

#[derive(Debug, Default, Deserialize)]
struct SegmentoQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentoResponse {
    titulo: &'static str,
    estadisticas: SegmentStats,
    operaciones: Vec<Operation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    operacion: Operation,
    analisis: Option<Analysis>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    campos_faltantes: Vec<String>,
}

impl ApiError {
    fn message(text: impl Into<String>) -> Self {
        Self { error: text.into(), campos_faltantes: Vec::new() }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn estado(State(state): State<ApiState>) -> Json<EstadoResponse> {
    let session = state.session.read().await;
    Json(EstadoResponse {
        modo_local: session.local_mode(),
        panel_activo: session.active_panel(),
        total_operaciones: session.records().len(),
    })
}

async fn set_panel(
    State(state): State<ApiState>,
    Json(request): Json<PanelRequest>,
) -> Response {
    let Some(panel) = Panel::parse(&request.panel) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::message(format!("Panel desconocido: {}", request.panel))),
        )
            .into_response();
    };

    let mut session = state.session.write().await;
    session.set_active_panel(panel);
    Json(EstadoResponse {
        modo_local: session.local_mode(),
        panel_activo: session.active_panel(),
        total_operaciones: session.records().len(),
    })
    .into_response()
}

async fn segmento(
    State(state): State<ApiState>,
    Path(tag): Path<String>,
    Query(query): Query<SegmentoQuery>,
) -> Response {
    let Some(segment) = Segment::parse(&tag) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::message(format!("Segmento desconocido: {tag}"))),
        )
            .into_response();
    };

    let session = state.session.read().await;
    let term = query.q.as_deref().map(str::trim).filter(|term| !term.is_empty());
    let operaciones: Vec<Operation> = match term {
        Some(term) => session.search(segment, term).into_iter().cloned().collect(),
        None => session.segment_view(segment).into_iter().cloned().collect(),
    };

    Json(SegmentoResponse {
        titulo: segment.as_str(),
        estadisticas: session.segment_stats(segment),
        operaciones,
    })
    .into_response()
}

async fn submit(State(state): State<ApiState>, Json(draft): Json<Operation>) -> Response {
    let mut session = state.session.write().await;
    let persisted = match session.submit(draft).await {
        Ok(persisted) => persisted,
        Err(SubmitError::Validation(failure)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiError {
                    error: failure.message().to_string(),
                    campos_faltantes: failure
                        .missing_fields()
                        .iter()
                        .map(|name| name.to_uppercase())
                        .collect(),
                }),
            )
                .into_response();
        }
        Err(SubmitError::Store(error)) => {
            warn!(event_name = "console.submit_failed", error = %error, "store insert failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiError::message("No se pudo guardar la operación. Intente nuevamente.")),
            )
                .into_response();
        }
    };
    drop(session);

    // Advisory only: one attempt, and the persisted operation is returned
    // whether or not an analysis came back.
    let analisis = match &state.analysis {
        Some(engine) => match engine.analyze(&persisted).await {
            Ok(analysis) => Some(analysis),
            Err(error) => {
                info!(
                    event_name = "console.analysis_unavailable",
                    error = %error,
                    "analysis unavailable for this submission"
                );
                None
            }
        },
        None => None,
    };

    (StatusCode::CREATED, Json(SubmitResponse { operacion: persisted, analisis }))
        .into_response()
}

async fn update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut patch_payload = OperationPatch::new();
    for (name, value) in body {
        if let Err(error) = patch_payload.set_value(&name, value) {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::message(format!("Campo inválido: {error}"))),
            )
                .into_response();
        }
    }

    let mut session = state.session.write().await;
    match session.apply_update(&OperationId(id), patch_payload).await {
        Ok(operation) => Json(operation).into_response(),
        Err(UpdateError::UnknownRecord(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::message("Operación no encontrada.")),
        )
            .into_response(),
        Err(UpdateError::Store(error)) => {
            warn!(event_name = "console.update_failed", error = %error, "store update failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiError::message(
                    "No se pudo actualizar la operación. Intente nuevamente.",
                )),
            )
                .into_response()
        }
    }
}
