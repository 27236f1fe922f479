//! Snapshot and write endpoints.
//!
//! ## Endpoints
//! - GET    {prefix}/translations.json - Captured translations since the last reset
//! - POST   {prefix}/translate         - Form-encoded `translations[locale][path]` edits
//! - POST   {prefix}/translate.json    - JSON `{"translations": {locale: {path: value}}}` edits
//! - DELETE {prefix}/translations      - Clear the capture

use axum::{
    Json,
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capture::Snapshot;
use crate::error::StoreError;
use crate::server::ServerState;
use crate::server::csrf::CSRF_FIELD;
use crate::store::apply_submission;
use crate::submission::{EditSubmission, SubmissionBody};

/// Snapshot query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Only return this locale.
    pub locale: Option<String>,
}

/// Write response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteResponse {
    /// Number of paths whose stored value changed.
    pub written: usize,
}

/// API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

impl ErrorResponse {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "INVALID_REQUEST" => StatusCode::BAD_REQUEST,
            "INVALID_TRANSLATION" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<StoreError> for ErrorResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidLocale(_)
            | StoreError::InvalidPath(_)
            | StoreError::PathConflict { .. } => Self::new("INVALID_TRANSLATION", err.to_string()),
            StoreError::Io { .. } | StoreError::Yaml { .. } => {
                Self::new("STORE_ERROR", err.to_string())
            }
        }
    }
}

/// GET {prefix}/translations.json - Current capture snapshot
///
/// Optional query parameters:
/// - `locale`: Only include this locale
pub async fn snapshot(
    State(state): State<ServerState>,
    Query(query): Query<SnapshotQuery>,
) -> Json<Snapshot> {
    info!("GET translations snapshot (locale={:?})", query.locale);
    let mut snapshot = state.accumulator.snapshot();
    if let Some(locale) = query.locale.as_deref() {
        snapshot.retain(|l, _| l == locale);
    }
    Json(snapshot)
}

/// POST {prefix}/translate - Form-encoded edits
pub async fn translate_form(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<WriteResponse>, ErrorResponse> {
    info!("POST translate ({} form fields)", pairs.len());
    let field_token = pairs
        .iter()
        .find(|(name, _)| name == CSRF_FIELD)
        .map(|(_, value)| value.clone());
    authorize(&state, &headers, field_token.as_deref())?;
    let submission = EditSubmission::from_form_pairs(pairs).map_err(|e| {
        warn!(error = %e, "rejected translation form");
        ErrorResponse::new("INVALID_REQUEST", e.to_string())
    })?;
    write(state, submission).await
}

/// POST {prefix}/translate.json - JSON edits
pub async fn translate_json(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<SubmissionBody>,
) -> Result<Json<WriteResponse>, ErrorResponse> {
    info!("POST translate.json ({} fields)", body.translations.len());
    authorize(&state, &headers, None)?;
    write(state, body.translations).await
}

/// DELETE {prefix}/translations - Clear the capture
pub async fn reset(State(state): State<ServerState>, headers: HeaderMap) -> Result<StatusCode, ErrorResponse> {
    info!("DELETE translations");
    authorize(&state, &headers, None)?;
    state.accumulator.reset();
    Ok(StatusCode::NO_CONTENT)
}

fn authorize(state: &ServerState, headers: &HeaderMap, field: Option<&str>) -> Result<(), ErrorResponse> {
    if state.csrf.verify(headers, field) {
        Ok(())
    } else {
        warn!("rejected write without a valid CSRF token");
        Err(ErrorResponse::new("FORBIDDEN", "invalid or missing CSRF token"))
    }
}

/// Apply on a blocking thread (the store flushes files), then start a fresh capture pass.
async fn write(state: ServerState, submission: EditSubmission) -> Result<Json<WriteResponse>, ErrorResponse> {
    let store = state.store.clone();
    let written = tokio::task::spawn_blocking(move || apply_submission(store.as_ref(), &submission))
        .await
        .map_err(|e| ErrorResponse::new("STORE_ERROR", format!("write task failed: {e}")))?
        .map_err(|e| {
            warn!(error = %e, "translation write failed");
            ErrorResponse::from(e)
        })?;
    state.accumulator.reset();
    info!(written, "translations saved");
    Ok(Json(WriteResponse { written }))
}
