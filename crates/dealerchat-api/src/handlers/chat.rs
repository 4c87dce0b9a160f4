//! Chat session handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use dealerchat_core::types::{ChatSessionId, FormInstanceId};

use super::parse_id;
use crate::dto::request::CreateSessionRequest;
use crate::dto::response::{ApiResponse, ChatSessionResponse, CloseSessionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthEmployee, ValidatedJson};
use crate::state::AppState;

/// POST /api/chat/sessions
///
/// Returns 201 with a new session, or 200 with the form's existing active one.
pub async fn open_session(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChatSessionResponse>>), ApiError> {
    let creation = state
        .realtime
        .sessions
        .open_session(req.form_instance_id, req.customer_name.as_deref())
        .await?;

    let status = if creation.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::ok(creation.into_session().into())),
    ))
}

/// GET /api/chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChatSessionResponse>>>, ApiError> {
    let sessions = state.realtime.sessions.list_sessions().await?;
    Ok(Json(ApiResponse::ok(
        sessions.into_iter().map(ChatSessionResponse::from).collect(),
    )))
}

/// GET /api/chat/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatSessionResponse>>, ApiError> {
    let session_id: ChatSessionId = parse_id(&id, "chat session")?;
    let session = state.realtime.sessions.get_session(session_id).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// GET /api/chat/session-by-form/{form_instance_id}
pub async fn session_by_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatSessionResponse>>, ApiError> {
    let form_instance_id: FormInstanceId = parse_id(&id, "form instance")?;
    let session = state
        .realtime
        .sessions
        .active_session_for_form(form_instance_id)
        .await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// PUT /api/chat/sessions/{id}/close
pub async fn close_session(
    State(state): State<AppState>,
    auth: AuthEmployee,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CloseSessionResponse>>, ApiError> {
    let session_id: ChatSessionId = parse_id(&id, "chat session")?;
    let session = state
        .realtime
        .sessions
        .close_session(session_id, auth.principal())
        .await?;

    Ok(Json(ApiResponse::ok(CloseSessionResponse {
        message: "Chat session closed successfully".to_string(),
        session: session.into(),
    })))
}
