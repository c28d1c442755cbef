//! HTTP surface over [`MissionService`]

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use tss_core::TssError;
use tss_procedures::{Procedure, ProcedureStatusReport};
use tss_transport::DatagramLink;

use crate::{
    EgressReport, EvaBundle, EvaView, HealthReport, LtvBundle, MissionService, TriageReport, UiaView,
};

type Shared<L> = State<Arc<MissionService<L>>>;

/// Rejection rendered as `{"detail": ...}`
pub struct ApiError(TssError);

impl From<TssError> for ApiError {
    fn from(e: TssError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            TssError::BadEvaId(_) => {
                (StatusCode::NOT_FOUND, "evaId must be 'eva1' or 'eva2'".to_string())
            }
            TssError::ProcedureNotFound(_) => {
                (StatusCode::NOT_FOUND, "Unknown procedureId".to_string())
            }
            other => {
                tracing::warn!("request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Routes under `/api/v1`
pub fn router<L: DatagramLink>(service: Arc<MissionService<L>>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::<L>))
        .route("/api/v1/eva", get(eva::<L>))
        .route("/api/v1/eva/errors", get(eva_errors::<L>))
        .route("/api/v1/eva/:eva_id", get(eva_by_id::<L>))
        .route("/api/v1/eva/:eva_id/uia", get(eva_uia::<L>))
        .route("/api/v1/eva/:eva_id/dcu", get(eva_dcu::<L>))
        .route("/api/v1/eva/:eva_id/imu", get(eva_imu::<L>))
        .route("/api/v1/eva/:eva_id/egress-readiness", get(egress_readiness::<L>))
        .route("/api/v1/status", get(eva_status::<L>))
        .route("/api/v1/ltv", get(ltv::<L>))
        .route("/api/v1/ltv/errors", get(ltv_errors::<L>))
        .route("/api/v1/ltv/signal", get(ltv_signal::<L>))
        .route("/api/v1/ltv/location", get(ltv_location::<L>))
        .route("/api/v1/ltv/triage", get(ltv_triage::<L>))
        .route("/api/v1/procedures/ltv", get(procedures::<L>))
        .route("/api/v1/procedures/ltv/:procedure_id", get(procedure::<L>))
        .route(
            "/api/v1/procedures/ltv/:procedure_id/status",
            get(procedure_status::<L>),
        )
        .with_state(service)
}

async fn health<L: DatagramLink>(State(svc): Shared<L>) -> Json<HealthReport> {
    Json(svc.health().await)
}

async fn eva<L: DatagramLink>(State(svc): Shared<L>) -> Json<EvaBundle> {
    Json(svc.eva_bundle().await)
}

async fn eva_errors<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(svc.eva_errors().await)
}

async fn eva_status<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(svc.eva_status().await)
}

async fn eva_by_id<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(eva_id): Path<String>,
) -> ApiResult<EvaView> {
    Ok(Json(svc.eva_view(&eva_id).await?))
}

async fn eva_uia<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(eva_id): Path<String>,
) -> ApiResult<UiaView> {
    Ok(Json(svc.eva_uia(&eva_id).await?))
}

async fn eva_dcu<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(eva_id): Path<String>,
) -> ApiResult<Value> {
    Ok(Json(svc.eva_dcu(&eva_id).await?))
}

async fn eva_imu<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(eva_id): Path<String>,
) -> ApiResult<Value> {
    Ok(Json(svc.eva_imu(&eva_id).await?))
}

async fn egress_readiness<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(eva_id): Path<String>,
) -> ApiResult<EgressReport> {
    Ok(Json(svc.egress_readiness(&eva_id).await?))
}

async fn ltv<L: DatagramLink>(State(svc): Shared<L>) -> Json<LtvBundle> {
    Json(svc.ltv_bundle().await)
}

async fn ltv_errors<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(svc.ltv_errors().await)
}

async fn ltv_signal<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(svc.ltv_signal().await)
}

async fn ltv_location<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(svc.ltv_location().await)
}

async fn ltv_triage<L: DatagramLink>(State(svc): Shared<L>) -> Json<TriageReport> {
    Json(svc.ltv_triage().await)
}

async fn procedures<L: DatagramLink>(State(svc): Shared<L>) -> Json<Value> {
    Json(json!({ "procedures": svc.ltv_procedures() }))
}

async fn procedure<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(procedure_id): Path<String>,
) -> ApiResult<Procedure> {
    Ok(Json(svc.ltv_procedure(&procedure_id)?))
}

async fn procedure_status<L: DatagramLink>(
    State(svc): Shared<L>,
    Path(procedure_id): Path<String>,
) -> ApiResult<ProcedureStatusReport> {
    Ok(Json(svc.ltv_procedure_status(&procedure_id).await?))
}
