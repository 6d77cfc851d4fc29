//! Subscriber list and broadcast notices.

use {
    crate::{delivery_routes::error_json, server::AppState},
    axum::{Json, extract::State, http::StatusCode},
    serde::Deserialize,
    snapsend_common::Channel,
    snapsend_routing::intake,
    tracing::{info, warn},
};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// `POST /api/notifications/subscribe` — add an email to the broadcast
/// list. Idempotent; `created` is false when the address was already there.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let email = req.email.trim().to_lowercase();
    intake::validate(Channel::Email, &email, None)
        .map_err(|e| error_json(StatusCode::BAD_REQUEST, e.to_string()))?;

    let created = state.gateway.subscribers.write().await.insert(email.clone());
    info!(email, created, "subscriber registered");
    Ok(Json(serde_json::json!({ "subscribed": true, "created": created })))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
    /// SMS and chat legs are not wired to subscriber records; when asked
    /// for, they are counted as simulated instead of sent.
    #[serde(default)]
    pub include_sms: bool,
    #[serde(default)]
    pub include_chat: bool,
}

/// `POST /api/notifications/broadcast` — send a text notice to every
/// subscriber over the email channel. Runs inline; the subscriber list is
/// small and the caller wants the per-address result.
pub async fn broadcast_handler(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if req.body.trim().is_empty() {
        return Err(error_json(StatusCode::BAD_REQUEST, "body is required"));
    }
    let Some(email) = state.gateway.adapters.get(Channel::Email) else {
        return Err(error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "email channel unavailable",
        ));
    };

    let text = match req.subject.as_deref().map(str::trim) {
        Some(subject) if !subject.is_empty() => format!("{subject}\n\n{}", req.body),
        _ => req.body.clone(),
    };

    let recipients: Vec<String> = state.gateway.subscribers.read().await.iter().cloned().collect();
    let total = recipients.len();
    let mut sent = 0usize;
    let mut failed = Vec::new();
    for recipient in recipients {
        match email.send_text(&recipient, &text).await {
            Ok(_) => sent += 1,
            Err(e) => {
                warn!(recipient, error = %e, "broadcast send failed");
                failed.push(serde_json::json!({ "email": recipient, "error": e.to_string() }));
            },
        }
    }

    let sms_simulated = if req.include_sms { total } else { 0 };
    let chat_simulated = if req.include_chat { total } else { 0 };

    info!(total, sent, failed = failed.len(), "broadcast finished");
    Ok(Json(serde_json::json!({
        "total": total,
        "sent": sent,
        "failed": failed,
        "sms_simulated": sms_simulated,
        "chat_simulated": chat_simulated,
    })))
}
