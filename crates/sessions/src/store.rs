//! In-memory link-session store.
//!
//! Expiry is evaluated lazily at every access; `evict_expired` is
//! housekeeping only and correctness never depends on it running.

use {
    crate::error::{Error, Result},
    snapsend_common::DeliveryRequest,
    std::{
        collections::HashMap,
        time::{Duration, Instant},
    },
    tracing::debug,
};

/// How long a session stays usable (mirrors the 15-minute window the
/// delivery UI advertises to the user).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// One pending handshake session.
struct LinkSession {
    /// Chat handle the user typed (e.g. `@guest`).
    handle: String,
    /// Chat id captured when the recipient started the bot.
    chat_id: Option<String>,
    /// The delivery held back until the handshake completes.
    request: DeliveryRequest,
    expires_at: Instant,
    linked: bool,
    sent: bool,
    task_id: Option<String>,
}

/// Read-only snapshot returned to the polling caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionStatus {
    pub linked: bool,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub expired: bool,
}

/// Result of completing a handshake.
#[derive(Debug, Clone)]
pub enum HandshakeOutcome {
    /// First completion: the stored request, with the captured chat id as
    /// the recipient, ready to dispatch.
    Linked { request: DeliveryRequest },
    /// The session was already linked; nothing to do. Keeps the side
    /// channel idempotent against duplicate webhook deliveries.
    AlreadyLinked,
}

/// All live sessions, keyed by token.
pub struct LinkSessionStore {
    sessions: HashMap<String, LinkSession>,
    ttl: Duration,
}

impl Default for LinkSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl LinkSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh session holding `request` until the recipient links.
    ///
    /// Returns the session token. Tokens are UUIDv4 — unguessable and never
    /// reused; the caller only ever holds the token, never the session.
    pub fn issue(&mut self, request: DeliveryRequest) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let session = LinkSession {
            handle: request.recipient.clone(),
            chat_id: None,
            request,
            expires_at: Instant::now() + self.ttl,
            linked: false,
            sent: false,
            task_id: None,
        };
        debug!(token, handle = %session.handle, "issued link session");
        self.sessions.insert(token.clone(), session);
        token
    }

    /// Mark the session linked and capture the recipient's chat id.
    ///
    /// On first completion, hands back the stored request rewritten to the
    /// captured chat id so the caller can run the actual send.
    pub fn complete_handshake(&mut self, token: &str, chat_id: &str) -> Result<HandshakeOutcome> {
        let now = Instant::now();
        let session = self.sessions.get_mut(token).ok_or(Error::NotFound)?;

        if now >= session.expires_at {
            return Err(Error::Expired);
        }
        if session.linked {
            return Ok(HandshakeOutcome::AlreadyLinked);
        }

        session.linked = true;
        session.chat_id = Some(chat_id.to_string());
        debug!(token, chat_id, handle = %session.handle, "handshake completed");

        let mut request = session.request.clone();
        request.recipient = chat_id.to_string();
        Ok(HandshakeOutcome::Linked { request })
    }

    /// Record that the held-back delivery went out, with its task id.
    ///
    /// Idempotent: a second call for an already-sent session is accepted
    /// and leaves the original task id in place, so a poll racing the send
    /// completion can never corrupt the record.
    pub fn mark_sent(&mut self, token: &str, task_id: &str) -> Result<()> {
        let now = Instant::now();
        let session = self.sessions.get_mut(token).ok_or(Error::NotFound)?;

        if session.sent {
            return Ok(());
        }
        if now >= session.expires_at {
            return Err(Error::Expired);
        }
        if !session.linked {
            return Err(Error::NotLinked);
        }

        session.sent = true;
        session.task_id = Some(task_id.to_string());
        debug!(token, task_id, "session delivery sent");
        Ok(())
    }

    /// Read the session state. Idempotent; never blocks.
    ///
    /// A sent session is terminal success and is never reported expired,
    /// even once its TTL has elapsed.
    pub fn status(&self, token: &str) -> Result<SessionStatus> {
        let session = self.sessions.get(token).ok_or(Error::NotFound)?;
        let expired = !session.sent && Instant::now() >= session.expires_at;
        Ok(SessionStatus {
            linked: session.linked,
            sent: session.sent,
            task_id: session.task_id.clone(),
            expired,
        })
    }

    /// Drop every session whose TTL elapsed, sent or not.
    ///
    /// Pollers stop at the first `sent = true` read, so a sent entry past
    /// its TTL has no remaining readers and holding it would leak one entry
    /// per delivery for the process lifetime.
    pub fn evict_expired(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, s| now < s.expires_at);
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, snapsend_common::Channel};

    fn request(recipient: &str) -> DeliveryRequest {
        DeliveryRequest {
            recipient: recipient.to_string(),
            photos: vec!["photo-1".into()],
            preferred: Channel::Chat,
            notification_phone: None,
        }
    }

    fn expire(store: &mut LinkSessionStore, token: &str) {
        store.sessions.get_mut(token).unwrap().expires_at = Instant::now() - Duration::from_secs(1);
    }

    #[test]
    fn issue_starts_unlinked() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));

        let status = store.status(&token).unwrap();
        assert_eq!(status, SessionStatus {
            linked: false,
            sent: false,
            task_id: None,
            expired: false,
        });
    }

    #[test]
    fn tokens_are_unique() {
        let mut store = LinkSessionStore::default();
        let a = store.issue(request("@guest"));
        let b = store.issue(request("@guest"));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn handshake_links_and_returns_request_with_chat_id() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));

        match store.complete_handshake(&token, "1234567").unwrap() {
            HandshakeOutcome::Linked { request } => {
                assert_eq!(request.recipient, "1234567");
                assert_eq!(request.photos, vec!["photo-1".to_string()]);
            },
            HandshakeOutcome::AlreadyLinked => panic!("expected first link"),
        }
        assert!(store.status(&token).unwrap().linked);
    }

    #[test]
    fn duplicate_handshake_is_idempotent() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));

        store.complete_handshake(&token, "1234567").unwrap();
        assert!(matches!(
            store.complete_handshake(&token, "1234567").unwrap(),
            HandshakeOutcome::AlreadyLinked
        ));
    }

    #[test]
    fn handshake_unknown_token() {
        let mut store = LinkSessionStore::default();
        assert_eq!(
            store.complete_handshake("ghost", "1").unwrap_err(),
            Error::NotFound
        );
    }

    #[test]
    fn handshake_after_expiry_fails() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));
        expire(&mut store, &token);

        assert_eq!(
            store.complete_handshake(&token, "1").unwrap_err(),
            Error::Expired
        );
    }

    #[test]
    fn mark_sent_requires_link() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));

        assert_eq!(store.mark_sent(&token, "task-1").unwrap_err(), Error::NotLinked);
    }

    #[test]
    fn mark_sent_records_task_and_is_idempotent() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));
        store.complete_handshake(&token, "1234567").unwrap();

        store.mark_sent(&token, "task-1").unwrap();
        // Second call (e.g. a duplicate completion callback) is a no-op.
        store.mark_sent(&token, "task-2").unwrap();

        let status = store.status(&token).unwrap();
        assert!(status.sent);
        assert_eq!(status.task_id.as_deref(), Some("task-1"));
    }

    #[test]
    fn status_is_idempotent() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));
        store.complete_handshake(&token, "1234567").unwrap();

        let first = store.status(&token).unwrap();
        let second = store.status(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expired_session_reports_expired_with_flags_intact() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));
        expire(&mut store, &token);

        let status = store.status(&token).unwrap();
        assert!(status.expired);
        assert!(!status.linked);
        assert!(!status.sent);
    }

    #[test]
    fn sent_session_never_reports_expired() {
        let mut store = LinkSessionStore::default();
        let token = store.issue(request("@guest"));
        store.complete_handshake(&token, "1234567").unwrap();
        store.mark_sent(&token, "task-1").unwrap();
        expire(&mut store, &token);

        let status = store.status(&token).unwrap();
        assert!(status.sent);
        assert!(!status.expired);
    }

    #[test]
    fn evict_drops_everything_past_ttl() {
        let mut store = LinkSessionStore::default();
        let stale = store.issue(request("@stale"));
        let done = store.issue(request("@done"));
        let live = store.issue(request("@live"));

        store.complete_handshake(&done, "42").unwrap();
        store.mark_sent(&done, "task-1").unwrap();
        expire(&mut store, &stale);
        expire(&mut store, &done);

        store.evict_expired();
        assert_eq!(store.status(&stale).unwrap_err(), Error::NotFound);
        // Sent sessions are dropped too once their TTL passes.
        assert_eq!(store.status(&done).unwrap_err(), Error::NotFound);
        assert!(!store.status(&live).unwrap().expired);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evict_keeps_sent_sessions_inside_ttl() {
        let mut store = LinkSessionStore::default();
        let done = store.issue(request("@done"));
        store.complete_handshake(&done, "42").unwrap();
        store.mark_sent(&done, "task-1").unwrap();

        store.evict_expired();
        assert!(store.status(&done).unwrap().sent);
        assert!(!store.is_empty());
    }
}
