//! Submission endpoint and task lookup.

use {
    crate::{server::AppState, tasks},
    axum::{
        Json,
        extract::{Path, State, rejection::JsonRejection},
        http::StatusCode,
        response::IntoResponse,
    },
    serde::Deserialize,
    snapsend_common::{Channel, DeliveryRequest},
    snapsend_routing::{intake, needs_handshake},
    tracing::info,
};

/// Incoming submission, field names as the booth UI sends them.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default = "default_method")]
    pub preferred_method: Channel,
    pub notification_phone: Option<String>,
}

fn default_method() -> Channel {
    Channel::Email
}

pub(crate) fn error_json(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

/// `POST /api/notifications/send`
///
/// Immediate channels: `202 {accepted, task_id}` with the dispatch running
/// in the background. Unlinked chat handles: `200` with the handshake
/// artifacts; nothing is attempted until the recipient links.
pub async fn send_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let Json(req) = payload
        .map_err(|_| error_json(StatusCode::BAD_REQUEST, "Invalid JSON payload"))?;

    let recipient = req.recipient.trim().to_string();
    intake::validate(
        req.preferred_method,
        &recipient,
        req.notification_phone.as_deref(),
    )
    .map_err(|e| error_json(StatusCode::BAD_REQUEST, e.to_string()))?;

    let request = DeliveryRequest {
        recipient,
        photos: req.photos,
        preferred: req.preferred_method,
        notification_phone: req.notification_phone.as_deref().map(intake::normalize_phone),
    };

    if request.preferred == Channel::Chat && needs_handshake(&request.recipient) {
        let outcome = state.gateway.dispatcher.dispatch(&request).await;
        let Some(handshake) = outcome.handshake else {
            return Err(error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to issue link session",
            ));
        };
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "accepted": true,
                "requires_handshake_start": true,
                "session_token": handshake.session_token,
                "activation_link": handshake.activation_link,
                "username": request.recipient,
            })),
        ));
    }

    let task_id = tasks::spawn_dispatch(state.gateway.clone(), request, None).await;
    info!(task_id, "accepted delivery request");
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "accepted": true, "task_id": task_id })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct TaskPath {
    pub task_id: String,
}

/// `GET /api/notifications/tasks/{task_id}` — task state, including the
/// full attempt log once the dispatch has finished.
pub async fn task_handler(
    State(state): State<AppState>,
    Path(TaskPath { task_id }): Path<TaskPath>,
) -> Result<Json<tasks::TaskState>, (StatusCode, Json<serde_json::Value>)> {
    match state.gateway.task(&task_id).await {
        Some(task) => Ok(Json(task)),
        None => Err(error_json(StatusCode::NOT_FOUND, "task not found")),
    }
}
