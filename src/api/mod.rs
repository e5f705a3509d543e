mod views;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::filing::FilingReport;
use crate::llm::QaAnswer;
use crate::session::{FilingAnalyzer, FilingSession, SessionStore};

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<FilingAnalyzer>,
    sessions: Arc<SessionStore>,
}

#[derive(Deserialize)]
pub struct AskForm {
    session_id: String,
    #[serde(default)]
    query: String,
}

#[derive(Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 1000))]
    query: String,
}

#[derive(Serialize)]
struct UploadResponse<'a> {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    report: &'a FilingReport,
    qa_enabled: bool,
    qa_error: Option<&'a str>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::EmptyQuery | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::QaUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProviderError(_) => StatusCode::BAD_GATEWAY,
            AppError::Extraction(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }
        (status, Json(ApiResponse { status: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, AppError>;

/// Create and configure the API router
pub fn create_api(analyzer: FilingAnalyzer, sessions: SessionStore) -> Router {
    let body_limit = analyzer.config().max_upload_bytes;
    let state = AppState {
        analyzer: Arc::new(analyzer),
        sessions: Arc::new(sessions),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_form_handler))
        .route("/ask", post(ask_form_handler))
        .route("/api/filings", post(upload_handler))
        .route("/api/filings/:id", get(report_handler))
        .route("/api/filings/:id/ask", post(ask_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

fn upload_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidRequest(format!("{}: {}", context, e))
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("malformed upload", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("failed to read upload", e))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(AppError::InvalidRequest("no file was uploaded".to_string()))
}

async fn analyze(state: &AppState, multipart: Multipart) -> Result<Arc<FilingSession>, AppError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let session = state.analyzer.analyze_upload(&file_name, bytes).await?;
    Ok(state.sessions.insert(session))
}

fn find_session(state: &AppState, id: &Uuid) -> Result<Arc<FilingSession>, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidRequest(format!("invalid session id '{}'", raw)))
}

async fn index_handler() -> Html<String> {
    Html(views::index_page(None))
}

async fn upload_form_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    match analyze(&state, multipart).await {
        Ok(session) => Html(views::session_page(&session, "", None, None)).into_response(),
        Err(e) => {
            log::warn!("Upload failed: {}", e);
            (e.status_code(), Html(views::index_page(Some(&e.to_string())))).into_response()
        }
    }
}

async fn ask_form_handler(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let session = match parse_session_id(&form.session_id).and_then(|id| find_session(&state, &id)) {
        Ok(session) => session,
        Err(e) => {
            let message = format!("{}. Please upload the document again.", e);
            return (e.status_code(), Html(views::index_page(Some(&message)))).into_response();
        }
    };

    let query = form.query.trim();
    if query.is_empty() {
        return Html(views::session_page(&session, "", None, None)).into_response();
    }

    match session.ask(query).await {
        Ok(answer) => Html(views::session_page(&session, query, Some(&answer), None)).into_response(),
        Err(e) => {
            log::error!("An error occurred while executing QA Section: {}", e);
            (
                e.status_code(),
                Html(views::session_page(&session, query, None, Some(&e.to_string()))),
            )
                .into_response()
        }
    }
}

async fn upload_handler(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let session = analyze(&state, multipart).await?;
    Ok(Json(UploadResponse {
        session_id: session.id,
        created_at: session.created_at,
        report: &session.report,
        qa_enabled: session.qa_enabled(),
        qa_error: session.qa_error.as_deref(),
    })
    .into_response())
}

async fn report_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<FilingReport> {
    let session = find_session(&state, &id)?;
    Ok(Json(session.report.clone()))
}

async fn ask_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> ApiResult<QaAnswer> {
    request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    let session = find_session(&state, &id)?;
    Ok(Json(session.ask(&request.query).await?))
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}
