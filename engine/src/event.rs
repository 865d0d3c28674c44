//! Input model: events as delivered to the transformer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EventError;

/// The closed set of event types the transformer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Identify,
    Track,
    Page,
    Screen,
    Group,
    Alias,
    Extract,
    Merge,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Identify,
        EventType::Track,
        EventType::Page,
        EventType::Screen,
        EventType::Group,
        EventType::Alias,
        EventType::Extract,
        EventType::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Identify => "identify",
            EventType::Track => "track",
            EventType::Page => "page",
            EventType::Screen => "screen",
            EventType::Group => "group",
            EventType::Alias => "alias",
            EventType::Extract => "extract",
            EventType::Merge => "merge",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| EventError::UnsupportedEventType(s.to_string()))
    }
}

/// Per-event metadata. Passed back untouched with every result record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventMetadata {
    pub event_type: String,
    pub destination_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    /// Identifier of the source record for cloud (extract) events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    /// `cloud` or `device`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_category: Option<String>,
}

/// Destination type plus its loosely typed option map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DestinationConfig {
    pub destination_type: String,
    pub config: Map<String, Value>,
}

/// One event of a transform batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEvent {
    pub payload: Value,
    #[serde(default)]
    pub metadata: EventMetadata,
    #[serde(default)]
    pub destination_config: DestinationConfig,
}

impl IncomingEvent {
    pub fn new(
        payload: Value,
        metadata: EventMetadata,
        destination_config: DestinationConfig,
    ) -> Self {
        Self {
            payload,
            metadata,
            destination_config,
        }
    }

    /// Destination type from the destination config, falling back to metadata.
    pub fn destination_type(&self) -> &str {
        if self.destination_config.destination_type.is_empty() {
            &self.metadata.destination_type
        } else {
            &self.destination_config.destination_type
        }
    }

    /// Event type from metadata, falling back to the payload `type` field.
    pub fn event_type(&self) -> Result<EventType, EventError> {
        let raw = if self.metadata.event_type.is_empty() {
            self.payload
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
        } else {
            self.metadata.event_type.as_str()
        };
        raw.parse()
    }
}

/// Whether a value carries no data: null or an empty string.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Non-blank value at a dotted path of object keys.
pub(crate) fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.get(*key)?;
    }
    (!is_blank(current)).then_some(current)
}

/// Render a scalar the way it appears as a plain string, without JSON quotes.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
