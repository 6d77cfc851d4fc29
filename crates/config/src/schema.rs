use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapsendConfig {
    pub server: ServerConfig,
    pub delivery: DeliveryConfig,
    pub chat: ChatConfig,
    pub email: EmailConfig,
    pub sms: SmsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Dispatch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Inject random per-channel provider outages to exercise the fallback
    /// path. Off by default; never enable in production.
    pub simulate_failures: bool,

    /// How long a chat link session stays usable.
    pub session_ttl_minutes: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            simulate_failures: false,
            session_ttl_minutes: 15,
        }
    }
}

/// Chat bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Bot username used to build the activation deep link
    /// (`https://t.me/{bot_name}?start={token}`).
    pub bot_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot_name: "snapsend_bot".into(),
        }
    }
}

/// Email sender settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: "booth@snapsend.local".into(),
        }
    }
}

/// SMS sender settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Sender number in international format; empty means provider default.
    pub from_number: String,
}
