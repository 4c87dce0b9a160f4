//! Notification dispatch handler.

use axum::Json;
use axum::extract::State;
use tracing::info;

use dealerchat_core::error::AppError;
use dealerchat_entity::notification::NotificationEvent;

use crate::dto::request::DispatchNotificationRequest;
use crate::dto::response::{ApiResponse, DispatchResponse};
use crate::error::ApiError;
use crate::extractors::{AuthEmployee, ValidatedJson};
use crate::state::AppState;

/// POST /api/notifications/dispatch
///
/// Pushes an event to the target's live connections. An offline target is
/// not an error; the report shows zero deliveries.
pub async fn dispatch(
    State(state): State<AppState>,
    auth: AuthEmployee,
    ValidatedJson(req): ValidatedJson<DispatchNotificationRequest>,
) -> Result<Json<ApiResponse<DispatchResponse>>, ApiError> {
    if !auth.role.can_dispatch_notifications() {
        return Err(AppError::authorization(format!(
            "Role '{}' cannot dispatch notifications",
            auth.role
        ))
        .into());
    }

    let event = NotificationEvent::new(req.event_type, req.user_id).with_payload(req.payload);
    let report = state
        .realtime
        .notifications
        .dispatch(event.user_id, &event)
        .await;

    info!(
        sender = %auth.employee_id,
        target = %event.user_id,
        event_type = %event.event_type,
        delivered = report.delivered,
        "Notification dispatched"
    );

    Ok(Json(ApiResponse::ok(DispatchResponse {
        event_type: event.event_type,
        user_id: event.user_id,
        report,
    })))
}
