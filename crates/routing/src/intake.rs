//! Cheap, fail-fast recipient checks. Runs before any adapter is invoked
//! and never touches the network.

use {snapsend_common::Channel, thiserror::Error};

/// Why a delivery request was rejected at intake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("recipient is required")]
    EmptyRecipient,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid chat recipient. Provide an @handle or a numeric chat id.")]
    InvalidChatHandle,

    #[error("Phone number must be in international format, e.g. +1234567890")]
    InvalidPhone,
}

/// Validate a recipient for `channel`, plus the optional confirmation phone.
///
/// Deterministic and side-effect free.
pub fn validate(
    channel: Channel,
    recipient: &str,
    notification_phone: Option<&str>,
) -> Result<(), ValidationError> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(ValidationError::EmptyRecipient);
    }

    match channel {
        Channel::Email => {
            if !is_valid_email(recipient) {
                return Err(ValidationError::InvalidEmail);
            }
        },
        Channel::Chat => {
            if !is_valid_chat_recipient(recipient) {
                return Err(ValidationError::InvalidChatHandle);
            }
        },
        // Structural phone checks are left to the SMS provider.
        Channel::Sms => {},
    }

    if let Some(phone) = notification_phone
        && !is_valid_phone(&normalize_phone(phone))
    {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(())
}

/// Strip the separators people type into phone numbers.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// local@domain.tld shape: exactly one `@`, non-empty local part, dotted
/// domain with non-empty labels.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

/// A chat recipient is either an `@handle` or a numeric chat id (the latter
/// means the recipient already started the bot).
fn is_valid_chat_recipient(s: &str) -> bool {
    if let Some(handle) = s.strip_prefix('@') {
        return !handle.is_empty();
    }
    s.chars().all(|c| c.is_ascii_digit())
}

/// `+` followed by 7 to 15 digits.
fn is_valid_phone(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('+') else {
        return false;
    };
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
