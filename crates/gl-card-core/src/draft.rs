//! Creation-draft field updates.
//!
//! Every form field change flows through [`apply_update`] as a tagged
//! message, keeping the per-field formatting rules in one place.

use gl_api_types::{CreationDraft, Theme};

pub const MESSAGE_MAX_CHARS: usize = 100;

/// One field change on the creation draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    RecipientName(String),
    RecipientAddress(String),
    RecipientEmail(String),
    Amount(String),
    Currency(String),
    Message(String),
    Theme(Theme),
}

pub fn apply_update(draft: &mut CreationDraft, update: FieldUpdate) {
    match update {
        FieldUpdate::RecipientName(value) => draft.recipient_name = value,
        FieldUpdate::RecipientAddress(value) => draft.recipient_address = value,
        FieldUpdate::RecipientEmail(value) => draft.recipient_email = value,
        FieldUpdate::Amount(value) => draft.amount = value,
        FieldUpdate::Currency(value) => draft.currency = value,
        FieldUpdate::Message(value) => draft.message = clamp_message(value),
        FieldUpdate::Theme(value) => draft.theme = value,
    }
}

/// Keep personal messages within the card limit.
pub fn clamp_message(message: String) -> String {
    if message.chars().count() <= MESSAGE_MAX_CHARS {
        return message;
    }
    message.chars().take(MESSAGE_MAX_CHARS).collect()
}
