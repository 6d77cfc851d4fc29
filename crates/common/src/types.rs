use serde::{Deserialize, Serialize};

/// An outbound delivery channel.
///
/// The declaration order here is the canonical fallback order: when the
/// preferred channel fails, the remaining channels are tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Chat,
}

impl Channel {
    /// All channels in canonical order.
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Chat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Chat => "chat",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "chat" => Ok(Channel::Chat),
            other => Err(crate::Error::message(format!("unknown channel: {other}"))),
        }
    }
}

/// A request to deliver a set of photos to one recipient.
///
/// Immutable once submitted; the dispatcher and session store only ever
/// read from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Recipient identifier. Semantics depend on the channel: email address,
    /// phone number, or chat handle / numeric chat id.
    pub recipient: String,
    /// Photo references (presigned URLs or data URLs), in capture order.
    pub photos: Vec<String>,
    /// Channel to try first.
    pub preferred: Channel,
    /// Optional phone number for a delivery-confirmation text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_phone: Option<String>,
}

/// Outcome of a single adapter invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub channel: Channel,
    pub success: bool,
    /// Human-readable description of what happened.
    pub detail: String,
    /// Underlying provider error, present on failed attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptResult {
    pub fn succeeded(channel: Channel, detail: impl Into<String>) -> Self {
        Self {
            channel,
            success: true,
            detail: detail.into(),
            error: None,
        }
    }

    pub fn failed(channel: Channel, error: impl std::fmt::Display) -> Self {
        Self {
            channel,
            success: false,
            detail: format!("Failed to send via {channel}"),
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Channel::Email).unwrap(), "\"email\"");
        let c: Channel = serde_json::from_str("\"chat\"").unwrap();
        assert_eq!(c, Channel::Chat);
    }

    #[test]
    fn channel_from_str_rejects_unknown() {
        assert!("telegram".parse::<Channel>().is_err());
        assert_eq!("sms".parse::<Channel>().unwrap(), Channel::Sms);
    }

    #[test]
    fn canonical_order_is_email_sms_chat() {
        assert_eq!(Channel::ALL, [Channel::Email, Channel::Sms, Channel::Chat]);
    }

    #[test]
    fn failed_attempt_keeps_cause() {
        let a = AttemptResult::failed(Channel::Sms, "sms provider unavailable");
        assert!(!a.success);
        assert_eq!(a.detail, "Failed to send via sms");
        assert_eq!(a.error.as_deref(), Some("sms provider unavailable"));
    }
}
