use {
    snapsend_channels::AdapterRegistry,
    snapsend_common::{AttemptResult, Channel, DeliveryRequest},
    snapsend_sessions::LinkSessionStore,
    std::sync::Arc,
    tokio::sync::RwLock,
    tracing::{info, warn},
};

/// Everything the submitting caller needs to drive the handshake UI.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HandshakeStart {
    pub session_token: String,
    /// Deep link the end user opens to start the bot.
    pub activation_link: String,
}

/// Result of one dispatch pass.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    /// One entry per adapter invocation, in true chronological order.
    pub attempts: Vec<AttemptResult>,
    /// Present when the request was parked behind a link session instead
    /// of being attempted; the outcome is provisional until it resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handshake: Option<HandshakeStart>,
}

impl DispatchOutcome {
    fn completed(success: bool, attempts: Vec<AttemptResult>) -> Self {
        Self {
            success,
            attempts,
            handshake: None,
        }
    }

    fn pending(handshake: HandshakeStart) -> Self {
        Self {
            success: false,
            attempts: Vec::new(),
            handshake: Some(handshake),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handshake.is_some()
    }
}

/// Build the attempt order: preferred channel first, the rest in canonical
/// order with the preferred channel removed.
pub fn attempt_order(preferred: Channel) -> Vec<Channel> {
    let mut order = vec![preferred];
    order.extend(Channel::ALL.iter().copied().filter(|c| *c != preferred));
    order
}

/// Chat handles need the out-of-band handshake; a numeric chat id means the
/// recipient already started the bot and can be pushed to directly.
pub fn needs_handshake(recipient: &str) -> bool {
    recipient.starts_with('@')
}

/// Orders channels, walks adapters in sequence, aggregates per-attempt
/// results, and decides overall success.
pub struct Dispatcher {
    adapters: Arc<AdapterRegistry>,
    sessions: Arc<RwLock<LinkSessionStore>>,
    bot_name: String,
}

impl Dispatcher {
    pub fn new(
        adapters: Arc<AdapterRegistry>,
        sessions: Arc<RwLock<LinkSessionStore>>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            adapters,
            sessions,
            bot_name: bot_name.into(),
        }
    }

    /// Dispatch one delivery request.
    ///
    /// A chat-preferred request for an unlinked handle never reaches an
    /// adapter: it is parked behind a fresh link session and the pending
    /// outcome carries the activation artifacts instead of attempts.
    pub async fn dispatch(&self, request: &DeliveryRequest) -> DispatchOutcome {
        if request.preferred == Channel::Chat && needs_handshake(&request.recipient) {
            let token = self.sessions.write().await.issue(request.clone());
            let activation_link = self.activation_link(&token);
            info!(handle = %request.recipient, "parked delivery behind link session");
            return DispatchOutcome::pending(HandshakeStart {
                session_token: token,
                activation_link,
            });
        }
        self.run_attempts(request).await
    }

    /// One sequential pass across the attempt order. First success wins and
    /// stops the pass; a failure is logged and the next channel is tried.
    pub async fn run_attempts(&self, request: &DeliveryRequest) -> DispatchOutcome {
        let mut attempts = Vec::new();

        for channel in attempt_order(request.preferred) {
            let Some(adapter) = self.adapters.get(channel) else {
                warn!(%channel, "no adapter registered");
                attempts.push(AttemptResult::failed(
                    channel,
                    format!("no adapter registered for {channel}"),
                ));
                continue;
            };

            match adapter.send_photos(&request.recipient, &request.photos).await {
                Ok(detail) => {
                    info!(%channel, detail, "delivery succeeded");
                    attempts.push(AttemptResult::succeeded(channel, detail));
                    return DispatchOutcome::completed(true, attempts);
                },
                Err(e) => {
                    warn!(%channel, error = %e, "delivery attempt failed, falling back");
                    attempts.push(AttemptResult::failed(channel, e));
                },
            }
        }

        DispatchOutcome::completed(false, attempts)
    }

    fn activation_link(&self, token: &str) -> String {
        format!("https://t.me/{}?start={token}", self.bot_name)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        snapsend_channels::{ChannelAdapter, error::Error as ChannelError},
        std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    /// Deterministic adapter double: succeeds or fails on command and
    /// counts invocations.
    struct ScriptedAdapter {
        channel: Channel,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChannelAdapter for ScriptedAdapter {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send_photos(
            &self,
            recipient: &str,
            photos: &[String],
        ) -> snapsend_channels::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(format!("sent {} photo(s) to {recipient}", photos.len()))
            } else {
                Err(ChannelError::unavailable(self.channel))
            }
        }
    }

    struct Script {
        dispatcher: Dispatcher,
        calls: [Arc<AtomicUsize>; 3],
    }

    /// Build a dispatcher whose email/sms/chat adapters succeed per the
    /// given flags, with per-channel call counters.
    fn scripted(email: bool, sms: bool, chat: bool) -> Script {
        let calls = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let mut registry = AdapterRegistry::new();
        for (channel, succeed, counter) in [
            (Channel::Email, email, &calls[0]),
            (Channel::Sms, sms, &calls[1]),
            (Channel::Chat, chat, &calls[2]),
        ] {
            registry.register(Arc::new(ScriptedAdapter {
                channel,
                succeed,
                calls: Arc::clone(counter),
            }));
        }
        let sessions = Arc::new(RwLock::new(LinkSessionStore::default()));
        Script {
            dispatcher: Dispatcher::new(Arc::new(registry), sessions, "snapsend_bot"),
            calls,
        }
    }

    fn request(recipient: &str, preferred: Channel) -> DeliveryRequest {
        DeliveryRequest {
            recipient: recipient.to_string(),
            photos: vec!["photo-1".into()],
            preferred,
            notification_phone: None,
        }
    }

    #[test]
    fn order_starts_with_preferred_then_canonical_remainder() {
        assert_eq!(attempt_order(Channel::Email), [
            Channel::Email,
            Channel::Sms,
            Channel::Chat
        ]);
        assert_eq!(attempt_order(Channel::Sms), [
            Channel::Sms,
            Channel::Email,
            Channel::Chat
        ]);
        assert_eq!(attempt_order(Channel::Chat), [
            Channel::Chat,
            Channel::Email,
            Channel::Sms
        ]);
    }

    #[tokio::test]
    async fn preferred_success_short_circuits() {
        let s = scripted(true, true, true);
        let outcome = s
            .dispatcher
            .dispatch(&request("guest@example.com", Channel::Email))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].channel, Channel::Email);
        // No adapter beyond the first was invoked.
        assert_eq!(s.calls[1].load(Ordering::SeqCst), 0);
        assert_eq!(s.calls[2].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_in_order_until_success() {
        let s = scripted(false, false, true);
        let outcome = s
            .dispatcher
            .dispatch(&request("+15550001", Channel::Sms))
            .await;

        assert!(outcome.success);
        let channels: Vec<Channel> = outcome.attempts.iter().map(|a| a.channel).collect();
        assert_eq!(channels, [Channel::Sms, Channel::Email, Channel::Chat]);
        assert!(!outcome.attempts[0].success);
        assert!(!outcome.attempts[1].success);
        assert!(outcome.attempts[2].success);
    }

    #[tokio::test]
    async fn total_failure_keeps_full_attempt_log() {
        let s = scripted(false, false, false);
        let outcome = s
            .dispatcher
            .dispatch(&request("guest@example.com", Channel::Email))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.attempts.len(), Channel::ALL.len());
        assert!(outcome.attempts.iter().all(|a| !a.success));
        assert!(
            outcome.attempts[0]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("email provider unavailable"))
        );
    }

    #[tokio::test]
    async fn chat_handle_parks_behind_session_without_attempts() {
        let s = scripted(false, false, false);
        let outcome = s.dispatcher.dispatch(&request("@guest", Channel::Chat)).await;

        assert!(outcome.is_pending());
        assert!(outcome.attempts.is_empty());
        for counter in &s.calls {
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }

        let handshake = outcome.handshake.unwrap();
        assert!(
            handshake
                .activation_link
                .contains(&handshake.session_token)
        );
        assert!(handshake.activation_link.starts_with("https://t.me/snapsend_bot?start="));
    }

    #[tokio::test]
    async fn numeric_chat_id_dispatches_directly() {
        let s = scripted(true, true, true);
        let outcome = s.dispatcher.dispatch(&request("123456789", Channel::Chat)).await;

        assert!(outcome.success);
        assert!(!outcome.is_pending());
        assert_eq!(outcome.attempts[0].channel, Channel::Chat);
    }

    #[tokio::test]
    async fn missing_adapter_is_a_logged_failure_not_a_crash() {
        let registry = AdapterRegistry::new();
        let sessions = Arc::new(RwLock::new(LinkSessionStore::default()));
        let dispatcher = Dispatcher::new(Arc::new(registry), sessions, "snapsend_bot");

        let outcome = dispatcher
            .dispatch(&request("guest@example.com", Channel::Email))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.attempts.len(), Channel::ALL.len());
    }
}
