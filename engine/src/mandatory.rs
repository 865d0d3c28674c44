//! Effective message id and received-at of an event.

use serde_json::Value;

use crate::event::{is_blank, value_to_string, EventMetadata};
use crate::hooks::Hooks;

/// Values every row derives its `id` and `received_at` from.
#[derive(Debug, Clone, PartialEq)]
pub struct MandatoryFields {
    pub message_id: Value,
    pub received_at: String,
}

impl MandatoryFields {
    /// Resolve from the payload, then metadata, then the hooks.
    ///
    /// The metadata is only read; callers get their original copy back in the
    /// result.
    pub fn resolve(payload: &Value, metadata: &EventMetadata, hooks: &Hooks) -> Self {
        let message_id = match payload.get("messageId") {
            Some(id) if !is_blank(id) => id.clone(),
            _ => match metadata.message_id.as_deref() {
                Some(id) if !id.is_empty() => Value::String(id.to_string()),
                _ => Value::String(format!("auto-{}", (hooks.uuid)())),
            },
        };

        let received_at = match payload.get("receivedAt") {
            Some(at) if !is_blank(at) => value_to_string(at),
            _ => match metadata.received_at.as_deref() {
                Some(at) if !at.is_empty() => at.to_string(),
                _ => hooks.now_string(),
            },
        };

        Self {
            message_id,
            received_at,
        }
    }
}
