//! Background dispatch tasks.
//!
//! Each accepted submission runs as a detached tokio task identified by a
//! UUID; the registry keeps the final outcome so the caller can fetch the
//! attempt log after the fact.

use {
    crate::state::GatewayState,
    serde::Serialize,
    snapsend_common::{Channel, DeliveryRequest},
    snapsend_routing::DispatchOutcome,
    std::{sync::Arc, time::Instant},
    tracing::{info, warn},
};

/// Registry entry for one background dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Running,
    Done {
        outcome: DispatchOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_notification: Option<StatusNotification>,
    },
}

/// Registry value: the serialized task state plus the finish time that
/// drives retention pruning.
pub(crate) struct TaskEntry {
    pub(crate) state: TaskState,
    pub(crate) done_at: Option<Instant>,
}

/// Record of the confirmation text sent after a successful delivery.
#[derive(Debug, Clone, Serialize)]
pub struct StatusNotification {
    pub sent: bool,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Spawn a background dispatch for `request`.
///
/// `session_token` is set for the post-handshake send of a parked chat
/// delivery; when that send succeeds the session is marked sent with this
/// task's id.
pub async fn spawn_dispatch(
    state: Arc<GatewayState>,
    request: DeliveryRequest,
    session_token: Option<String>,
) -> String {
    let task_id = uuid::Uuid::new_v4().to_string();
    state.tasks.write().await.insert(task_id.clone(), TaskEntry {
        state: TaskState::Running,
        done_at: None,
    });

    let id = task_id.clone();
    tokio::spawn(async move {
        run_dispatch(state, request, session_token, id).await;
    });

    task_id
}

async fn run_dispatch(
    state: Arc<GatewayState>,
    request: DeliveryRequest,
    session_token: Option<String>,
    task_id: String,
) {
    let outcome = state.dispatcher.dispatch(&request).await;
    info!(
        task_id,
        success = outcome.success,
        attempts = outcome.attempts.len(),
        "dispatch finished"
    );

    let status_notification = send_status_notice(&state, &request, &outcome).await;

    // Publish the outcome before flipping the session to sent, so a poller
    // that observes sent=true always finds the finished task.
    state.tasks.write().await.insert(task_id.clone(), TaskEntry {
        state: TaskState::Done {
            outcome: outcome.clone(),
            status_notification,
        },
        done_at: Some(Instant::now()),
    });

    if let Some(token) = session_token
        && outcome.success
        && let Err(e) = state.sessions.write().await.mark_sent(&token, &task_id)
    {
        warn!(task_id, error = %e, "could not mark session sent");
    }
}

/// Text the confirmation phone after a successful email/chat delivery.
///
/// Skipped when the photos went out via SMS (the recipient's phone already
/// saw a text). A failed notice is recorded but never affects the delivery
/// outcome.
async fn send_status_notice(
    state: &GatewayState,
    request: &DeliveryRequest,
    outcome: &DispatchOutcome,
) -> Option<StatusNotification> {
    let phone = request.notification_phone.as_deref()?;
    if !outcome.success {
        return None;
    }
    let delivered_via = outcome
        .attempts
        .last()
        .map(|a| a.channel)
        .unwrap_or(request.preferred);
    if !matches!(delivered_via, Channel::Email | Channel::Chat) {
        return None;
    }

    let message = format!("Your photos were delivered via {delivered_via}.");

    let Some(sms) = state.adapters.get(Channel::Sms) else {
        return None;
    };
    match sms.send_text(phone, &message).await {
        Ok(_) => Some(StatusNotification {
            sent: true,
            channel: Channel::Sms,
            message: Some(message),
            error: None,
        }),
        Err(e) => {
            warn!(error = %e, "status notice failed");
            Some(StatusNotification {
                sent: false,
                channel: Channel::Sms,
                message: None,
                error: Some(e.to_string()),
            })
        },
    }
}
