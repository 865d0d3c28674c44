//! Batch orchestration.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::TransformerConfig;
use crate::dialect::Dialect;
use crate::error::{Error, EventError, Result, STATUS_OK};
use crate::event::{EventMetadata, IncomingEvent};
use crate::handlers::{self, EventContext};
use crate::hooks::Hooks;
use crate::mandatory::MandatoryFields;
use crate::naming::Namer;
use crate::options::EventOptions;
use crate::row::Row;

/// A produced row together with the metadata of the event it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedEvent {
    pub output: Row,
    pub metadata: EventMetadata,
    pub status_code: u16,
}

/// An event that produced no rows because it failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEvent {
    pub metadata: EventMetadata,
    pub error: EventError,
    /// Stable name of the error, see [`EventError::kind`]
    pub error_kind: &'static str,
    pub status_code: u16,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub events: Vec<TransformedEvent>,
    pub failed_events: Vec<FailedEvent>,
}

/// Converts event batches into warehouse rows.
///
/// A transformer holds no per-call state and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use whrow_engine::{IncomingEvent, Transformer, TransformerConfig};
/// use serde_json::json;
///
/// let event: IncomingEvent = serde_json::from_value(json!({
///     "payload": {"type": "page", "messageId": "m1", "name": "Home"},
///     "metadata": {"destinationType": "POSTGRES", "receivedAt": "2021-09-01T00:00:00.000Z"},
///     "destinationConfig": {}
/// }))
/// .unwrap();
///
/// let result = Transformer::new(TransformerConfig::default())
///     .transform(&[event])
///     .unwrap();
/// assert_eq!(result.events[0].output.table(), "pages");
/// assert_eq!(result.events[0].output.data["name"], json!("Home"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformerConfig,
    hooks: Hooks,
}

impl Transformer {
    pub fn new(config: TransformerConfig) -> Self {
        Self {
            config,
            hooks: Hooks::default(),
        }
    }

    /// Replace the clock, uuid and key sorter.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Transform a batch.
    ///
    /// Destination types and configs of every event are validated before any
    /// event is processed; a bad one fails the whole call. After that each
    /// event either contributes its rows or one failure record.
    pub fn transform(&self, batch: &[IncomingEvent]) -> Result<TransformResult> {
        let mut prepared = Vec::with_capacity(batch.len());
        for event in batch {
            let destination_type = event.destination_type();
            let dialect = Dialect::lookup(destination_type)
                .ok_or_else(|| Error::UnknownDestination(destination_type.to_string()))?;
            let options = EventOptions::resolve(
                &event.payload,
                &event.metadata,
                &event.destination_config.config,
                destination_type,
            )?;
            prepared.push((dialect, options));
        }

        debug!(events = batch.len(), "transforming batch");

        let mut result = TransformResult::default();
        for (event, (dialect, options)) in batch.iter().zip(prepared) {
            match self.transform_event(event, dialect, &options) {
                Ok(rows) => {
                    result
                        .events
                        .extend(rows.into_iter().map(|output| TransformedEvent {
                            output,
                            metadata: event.metadata.clone(),
                            status_code: STATUS_OK,
                        }));
                }
                Err(error) => {
                    warn!(
                        event_type = %event.metadata.event_type,
                        destination_type = dialect.name,
                        kind = error.kind(),
                        %error,
                        "event failed"
                    );
                    result.failed_events.push(FailedEvent {
                        metadata: event.metadata.clone(),
                        status_code: error.status_code(),
                        error_kind: error.kind(),
                        error,
                    });
                }
            }
        }

        debug!(
            rows = result.events.len(),
            failed = result.failed_events.len(),
            "batch transformed"
        );
        Ok(result)
    }

    fn transform_event(
        &self,
        event: &IncomingEvent,
        dialect: &'static Dialect,
        options: &EventOptions,
    ) -> std::result::Result<Vec<Row>, EventError> {
        if !event.payload.is_object() {
            return Err(EventError::InvalidPayload(
                "payload must be a JSON object".to_string(),
            ));
        }
        let event_type = event.event_type()?;

        let mut payload = event.payload.clone();
        if self.config.populate_src_dest_info_in_context {
            populate_context(&mut payload, &event.metadata, dialect.name);
        }

        let ctx = EventContext {
            mandatory: MandatoryFields::resolve(&payload, &event.metadata, &self.hooks),
            payload: &payload,
            metadata: &event.metadata,
            event_type,
            dialect,
            namer: Namer::new(dialect, options.skip_reserved_keywords_escaping),
            options,
            config: &self.config,
            hooks: &self.hooks,
        };
        let rows = handlers::handle(&ctx)?;

        if !dialect.datalake {
            let max = self.config.max_columns_in_event;
            for row in rows.iter().filter(|row| !row.is_merge_rule()) {
                if row.data.len() > max {
                    return Err(EventError::TooManyColumns {
                        count: row.data.len(),
                        max,
                    });
                }
            }
        }

        Ok(rows)
    }
}

/// Copy source and destination identifiers into `context`.
fn populate_context(payload: &mut Value, metadata: &EventMetadata, destination_type: &str) {
    let Some(object) = payload.as_object_mut() else {
        return;
    };
    let context = object
        .entry("context")
        .or_insert_with(|| Value::Object(Map::new()));
    if context.is_null() {
        *context = Value::Object(Map::new());
    }
    let Some(context) = context.as_object_mut() else {
        return;
    };

    let fields = [
        ("sourceId", metadata.source_id.as_deref()),
        ("sourceType", metadata.source_type.as_deref()),
        ("destinationId", metadata.destination_id.as_deref()),
        ("destinationType", Some(destination_type)),
    ];
    for (key, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            context.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
}
