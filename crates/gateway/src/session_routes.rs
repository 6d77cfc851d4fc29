//! Link-session polling and the handshake side channel.

use {
    crate::{delivery_routes::error_json, server::AppState, tasks},
    axum::{Json, extract::{Query, State}, http::StatusCode},
    serde::Deserialize,
    snapsend_sessions::{Error as SessionError, HandshakeOutcome, SessionStatus},
    tracing::info,
};

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_token: String,
}

/// `GET /api/notifications/chat/session?session_token=...`
///
/// Polled by the booth UI while the recipient completes the handshake.
pub async fn session_status_handler(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionStatus>, (StatusCode, Json<serde_json::Value>)> {
    let sessions = state.gateway.sessions.read().await;
    match sessions.status(&query.session_token) {
        Ok(status) => Ok(Json(status)),
        Err(_) => Err(error_json(StatusCode::NOT_FOUND, "session not found")),
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub session_token: String,
    /// Chat id captured when the recipient started the bot.
    pub chat_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `POST /api/notifications/chat/link`
///
/// Called by the bot webhook when a recipient opens the activation link.
/// First completion releases the parked delivery as a background task;
/// repeats are acknowledged without dispatching again.
pub async fn link_handler(
    State(state): State<AppState>,
    Json(req): Json<LinkRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let outcome = state
        .gateway
        .sessions
        .write()
        .await
        .complete_handshake(&req.session_token, &req.chat_id);

    match outcome {
        Ok(HandshakeOutcome::Linked { request }) => {
            info!(
                chat_id = %req.chat_id,
                username = req.username.as_deref().unwrap_or(""),
                "link session completed, releasing parked delivery"
            );
            let task_id = tasks::spawn_dispatch(
                state.gateway.clone(),
                request,
                Some(req.session_token),
            )
            .await;
            Ok(Json(serde_json::json!({ "linked": true, "task_id": task_id })))
        },
        Ok(HandshakeOutcome::AlreadyLinked) => {
            Ok(Json(serde_json::json!({ "linked": true })))
        },
        Err(SessionError::Expired) => Err(error_json(StatusCode::GONE, "session expired")),
        Err(_) => Err(error_json(StatusCode::NOT_FOUND, "session not found")),
    }
}
