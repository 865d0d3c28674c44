//! Error types for the whrow engine.
//!
//! Two channels exist. [`Error`] is fatal and rejects a whole batch before any
//! event is processed. [`EventError`] is local to one event and is reported in
//! [`TransformResult::failed_events`](crate::TransformResult) while the rest of
//! the batch carries on.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Fatal errors that make a whole batch unprocessable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown destination type: {0}")]
    UnknownDestination(String),

    #[error("invalid destination config: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP-style status attached to every per-event failure.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Status attached to every successfully produced row.
pub const STATUS_OK: u16 = 200;

/// Validation failures scoped to a single event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    // Merge validation, checked in declaration order
    #[error("either or both identifiers missing in mergeProperties")]
    MergePropertiesMissing,

    #[error("mergeProperties should be an array")]
    MergePropertiesNotArray,

    #[error("mergeProperties contains less than 2 identifiers")]
    MergePropertiesNotSufficient,

    #[error("mergeProperties contains null values for expected inputs")]
    MergePropertyOneInvalid,

    #[error("mergeProperties contains null values for expected inputs")]
    MergePropertyTwoInvalid,

    #[error("mergeProperties contains null values for expected inputs")]
    MergePropertyEmpty,

    // Record id
    #[error("recordId cannot be empty for cloud sources events")]
    RecordIdEmpty,

    #[error("recordId cannot be an object")]
    RecordIdObject,

    // Event shape
    #[error("cannot create event table with empty event name, event name is missing in the payload")]
    ExtractEventNameEmpty,

    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),

    #[error("too many columns outputted from the event: {count} exceeds {max}")]
    TooManyColumns { count: usize, max: usize },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl EventError {
    /// HTTP-style status code reported alongside the failure.
    pub fn status_code(&self) -> u16 {
        STATUS_BAD_REQUEST
    }

    /// Stable identifier of the error kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            EventError::MergePropertiesMissing => "MergePropertiesMissing",
            EventError::MergePropertiesNotArray => "MergePropertiesNotArray",
            EventError::MergePropertiesNotSufficient => "MergePropertiesNotSufficient",
            EventError::MergePropertyOneInvalid => "MergePropertyOneInvalid",
            EventError::MergePropertyTwoInvalid => "MergePropertyTwoInvalid",
            EventError::MergePropertyEmpty => "MergePropertyEmpty",
            EventError::RecordIdEmpty => "RecordIDEmpty",
            EventError::RecordIdObject => "RecordIDObject",
            EventError::ExtractEventNameEmpty => "ExtractEventNameEmpty",
            EventError::UnsupportedEventType(_) => "UnsupportedEventType",
            EventError::TooManyColumns { .. } => "TooManyColumns",
            EventError::InvalidPayload(_) => "InvalidPayload",
        }
    }
}

/// Failures travel on the wire as their message.
impl Serialize for EventError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
