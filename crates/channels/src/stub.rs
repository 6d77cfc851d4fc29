//! Stub adapters with simulated provider latency and optional random
//! outages, used to exercise the fallback path without real providers.
//!
//! Failure rates only apply when `simulate_failures` is on; with it off the
//! stubs are deterministic and always succeed, which is what the
//! integration tests rely on.

use {
    crate::{
        adapter::{AdapterRegistry, ChannelAdapter},
        error::{Error, Result},
    },
    async_trait::async_trait,
    rand::Rng,
    snapsend_common::Channel,
    std::{sync::Arc, time::Duration},
    tracing::debug,
};

/// Per-channel simulated outage rates.
const EMAIL_FAIL_RATE: f64 = 0.20;
const SMS_FAIL_RATE: f64 = 0.25;
const CHAT_FAIL_RATE: f64 = 0.15;

/// Shared behavior for all stubs: artificial latency plus an optional
/// random outage before the "send".
#[derive(Debug, Clone)]
struct StubBehavior {
    channel: Channel,
    latency: Duration,
    fail_rate: f64,
    simulate_failures: bool,
}

impl StubBehavior {
    async fn simulate_provider(&self) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        if self.simulate_failures && rand::rng().random::<f64>() < self.fail_rate {
            debug!(channel = %self.channel, "simulated provider outage");
            return Err(Error::unavailable(self.channel));
        }
        Ok(())
    }
}

/// Simulated email provider.
pub struct EmailStub {
    behavior: StubBehavior,
}

impl EmailStub {
    pub fn new(simulate_failures: bool) -> Self {
        Self {
            behavior: StubBehavior {
                channel: Channel::Email,
                latency: Duration::from_millis(400),
                fail_rate: EMAIL_FAIL_RATE,
                simulate_failures,
            },
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behavior.latency = latency;
        self
    }
}

#[async_trait]
impl ChannelAdapter for EmailStub {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send_photos(&self, recipient: &str, photos: &[String]) -> Result<String> {
        self.behavior.simulate_provider().await?;
        Ok(format!(
            "Sent {} photo(s) to {recipient} by email",
            photos.len()
        ))
    }

    async fn send_text(&self, recipient: &str, _text: &str) -> Result<String> {
        self.behavior.simulate_provider().await?;
        Ok(format!("Sent email to {recipient}"))
    }
}

/// Simulated SMS gateway.
pub struct SmsStub {
    behavior: StubBehavior,
}

impl SmsStub {
    pub fn new(simulate_failures: bool) -> Self {
        Self {
            behavior: StubBehavior {
                channel: Channel::Sms,
                latency: Duration::from_millis(500),
                fail_rate: SMS_FAIL_RATE,
                simulate_failures,
            },
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behavior.latency = latency;
        self
    }
}

#[async_trait]
impl ChannelAdapter for SmsStub {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send_photos(&self, recipient: &str, photos: &[String]) -> Result<String> {
        self.behavior.simulate_provider().await?;
        Ok(format!(
            "Sent download links for {} photo(s) via SMS to {recipient}",
            photos.len()
        ))
    }

    async fn send_text(&self, recipient: &str, _text: &str) -> Result<String> {
        self.behavior.simulate_provider().await?;
        Ok(format!("Sent text via SMS to {recipient}"))
    }
}

/// Simulated chat bot push.
pub struct ChatStub {
    behavior: StubBehavior,
}

impl ChatStub {
    pub fn new(simulate_failures: bool) -> Self {
        Self {
            behavior: StubBehavior {
                channel: Channel::Chat,
                latency: Duration::from_millis(450),
                fail_rate: CHAT_FAIL_RATE,
                simulate_failures,
            },
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behavior.latency = latency;
        self
    }
}

#[async_trait]
impl ChannelAdapter for ChatStub {
    fn channel(&self) -> Channel {
        Channel::Chat
    }

    async fn send_photos(&self, recipient: &str, photos: &[String]) -> Result<String> {
        self.behavior.simulate_provider().await?;
        let handle = recipient.strip_prefix('@').unwrap_or(recipient);
        Ok(format!(
            "Delivered {} photo(s) to @{handle} on chat",
            photos.len()
        ))
    }

    async fn send_text(&self, recipient: &str, _text: &str) -> Result<String> {
        self.behavior.simulate_provider().await?;
        Ok(format!("Delivered chat message to {recipient}"))
    }
}

/// Build a registry with all three stubs.
///
/// `latency` of zero makes the stubs immediate for tests.
pub fn stub_registry(simulate_failures: bool, latency: Option<Duration>) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    match latency {
        Some(l) => {
            registry.register(Arc::new(EmailStub::new(simulate_failures).with_latency(l)));
            registry.register(Arc::new(SmsStub::new(simulate_failures).with_latency(l)));
            registry.register(Arc::new(ChatStub::new(simulate_failures).with_latency(l)));
        },
        None => {
            registry.register(Arc::new(EmailStub::new(simulate_failures)));
            registry.register(Arc::new(SmsStub::new(simulate_failures)));
            registry.register(Arc::new(ChatStub::new(simulate_failures)));
        },
    }
    registry
}
