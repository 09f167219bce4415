use crate::analyze_request::AnalyzeRequest;
use crate::analyze_response::{AnalyzeResponse, ErrorBody};
use crate::chat_request::{ChatRequest, ChatResponse};
use crate::export_request::ExportRequest;
use crate::AppState;
use analysis_engine::{csv_export, AnalysisError, ProgressUpdate};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SESSION_HEADER: &str = "x-session-id";
const DEFAULT_SESSION: &str = "anonymous";

pub const SUPPORTED_STANDARDS: [&str; 5] = [
    "VDI 3814",
    "ISO 16484",
    "ISO 14617",
    "IEC 60617",
    "DIN EN 81346",
];

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    let session = session_id(&headers);

    let Some(file) = payload.file else {
        return error_response(StatusCode::BAD_REQUEST, "no file data provided");
    };

    let Some(service) = &state.service else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "AI service unavailable - OpenAI API key not configured",
        );
    };

    match service
        .analyze(&file, payload.message.as_deref(), &session)
        .await
    {
        Ok(outcome) => {
            // A total failure still ships the placeholder row in the body.
            let status = if outcome.succeeded {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(AnalyzeResponse {
                    response: outcome.response,
                    bom: outcome.bom,
                }),
            )
                .into_response()
        }
        Err(err) => {
            log::error!("analysis request failed: {}", err);
            let status = match &err {
                AnalysisError::Input(_) => StatusCode::BAD_REQUEST,
                AnalysisError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AnalysisError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, &err.to_string())
        }
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let Some(message) = payload.message.filter(|m| !m.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "no message provided");
    };

    let Some(service) = &state.service else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "AI service unavailable - OpenAI API key not configured",
        );
    };

    match service
        .chat(&message, payload.context.unwrap_or_default())
        .await
    {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(err) => {
            log::error!("chat request failed: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to process message")
        }
    }
}

pub async fn progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ProgressUpdate> {
    let session = session_id(&headers);
    Json(
        state
            .progress
            .get(&session)
            .await
            .unwrap_or_else(ProgressUpdate::idle),
    )
}

pub async fn export(Json(payload): Json<ExportRequest>) -> Response {
    let csv = csv_export::export_bom(&payload.bom);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bill_of_materials.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model": state.model_name,
        "aiAvailable": state.service.is_some(),
        "standards": SUPPORTED_STANDARDS,
        "timestamp": now_millis(),
    }))
}

pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({
        "status": "awake",
        "timestamp": now_millis(),
        "message": "backend is awake and ready",
    }))
}

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
