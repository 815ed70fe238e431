use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use runner_core::{
    languages, FailureKind, Language, LanguageSpec, RunOutcome, RunReport, RunnerConfig,
    RunnerService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Runner error: {0}")]
    RunnerError(#[from] runner_core::Error),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::UnknownLanguage(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::RunnerError(runner_core::Error::Busy) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ServerError::RunnerError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::ServerError(e) => {
                error!("internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RunRequestBody {
    pub language: String,
    pub code: String,
}

/// Wire form of a delivered run: the worker response shape plus bookkeeping
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponseBody {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub lang: String,
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub status: String,
    pub elapsed_ms: u64,
}

impl RunResponseBody {
    fn from_report(report: RunReport, requested: &str) -> Self {
        let lang = report
            .language
            .map(|language| language.id().to_string())
            .unwrap_or_else(|| requested.to_string());
        let status = report.status().to_string();
        let elapsed_ms = report.elapsed.as_millis() as u64;

        let (kind, logs, result, error, failure) = match report.outcome {
            RunOutcome::Success { logs, result } => ("success", logs, Some(result), None, None),
            RunOutcome::Failure { kind, logs, error } => {
                ("error", logs, None, Some(error), Some(kind))
            }
            RunOutcome::Timeout { after } => (
                "error",
                Vec::new(),
                None,
                Some(format!(
                    "Execution timeout ({} seconds exceeded)",
                    after.as_secs()
                )),
                None,
            ),
        };

        Self {
            id: report.id,
            kind: kind.to_string(),
            lang,
            logs,
            result,
            error,
            failure,
            status,
            elapsed_ms,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<RunnerService>,
}

pub fn create_app(service: Arc<RunnerService>) -> Router {
    let state = AppState { service };

    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/languages/:id/sample", get(sample_source))
        .route("/run", post(run))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the runner from `config` and wrap it in a router
pub fn create_app_from_config(config: RunnerConfig) -> Result<Router, ServerError> {
    let service = RunnerService::new(config).map_err(ServerError::RunnerError)?;
    Ok(create_app(Arc::new(service)))
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting code runner server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    serve(listener, app).await
}

/// Serve `app` on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_languages(State(state): State<AppState>) -> Json<&'static [LanguageSpec]> {
    Json(state.service.languages())
}

async fn sample_source(Path(id): Path<String>) -> Result<String, ServerError> {
    let language: Language = id.parse().map_err(|_| ServerError::UnknownLanguage(id))?;
    Ok(languages::spec(language).sample_source.to_string())
}

async fn run(
    State(state): State<AppState>,
    Json(payload): Json<RunRequestBody>,
) -> Result<Json<RunResponseBody>, ServerError> {
    let report = state
        .service
        .run_source(&payload.language, payload.code)
        .await?;

    Ok(Json(RunResponseBody::from_report(report, &payload.language)))
}
