//! Fixed column rules shared by the event handlers.
//!
//! A rule derives one column from the payload and the resolved mandatory
//! fields. The union of a type's rule columns is also its set of reserved
//! columns: user-supplied keys that normalize onto them are dropped during
//! flattening.

use serde_json::Value;

use crate::column::ColumnType;
use crate::error::EventError;
use crate::event::{is_blank, lookup, EventMetadata, EventType};
use crate::flatten::Columns;
use crate::mandatory::MandatoryFields;
use crate::naming::Namer;

/// Inputs a rule may read.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub payload: &'a Value,
    pub mandatory: &'a MandatoryFields,
}

/// Derives the value of a single column.
#[derive(Clone, Copy)]
pub struct Rule {
    pub column: &'static str,
    resolve: fn(&RuleContext<'_>) -> Option<Value>,
    /// Declared type regardless of the inferred one
    forced: Option<ColumnType>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("column", &self.column).finish()
    }
}

const fn rule(column: &'static str, resolve: fn(&RuleContext<'_>) -> Option<Value>) -> Rule {
    Rule {
        column,
        resolve,
        forced: None,
    }
}

fn field(ctx: &RuleContext<'_>, key: &str) -> Option<Value> {
    lookup(ctx.payload, &[key]).cloned()
}

fn message_id(ctx: &RuleContext<'_>) -> Option<Value> {
    Some(ctx.mandatory.message_id.clone())
}

fn anonymous_id(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "anonymousId")
}

fn user_id(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "userId")
}

fn sent_at(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "sentAt")
}

fn timestamp(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "timestamp")
}

fn received_at(ctx: &RuleContext<'_>) -> Option<Value> {
    Some(Value::String(ctx.mandatory.received_at.clone()))
}

fn original_timestamp(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "originalTimestamp")
}

fn channel(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "channel")
}

fn context_ip(ctx: &RuleContext<'_>) -> Option<Value> {
    lookup(ctx.payload, &["context", "ip"])
        .or_else(|| lookup(ctx.payload, &["request_ip"]))
        .cloned()
}

fn context_request_ip(ctx: &RuleContext<'_>) -> Option<Value> {
    field(ctx, "request_ip")
}

fn context_passed_ip(ctx: &RuleContext<'_>) -> Option<Value> {
    lookup(ctx.payload, &["context", "ip"]).cloned()
}

/// Columns every primary row carries.
pub const DEFAULT_RULES: &[Rule] = &[
    rule("id", message_id),
    rule("anonymous_id", anonymous_id),
    rule("user_id", user_id),
    rule("sent_at", sent_at),
    rule("timestamp", timestamp),
    Rule {
        column: "received_at",
        resolve: received_at,
        forced: Some(ColumnType::Datetime),
    },
    rule("original_timestamp", original_timestamp),
    rule("channel", channel),
];

/// Client address columns.
pub const IP_RULES: &[Rule] = &[
    rule("context_ip", context_ip),
    rule("context_request_ip", context_request_ip),
    rule("context_passed_ip", context_passed_ip),
];

/// Timestamps copied onto the `users` row of non-datalake destinations.
pub const USER_TIMESTAMP_RULES: &[Rule] = &[
    rule("original_timestamp", original_timestamp),
    rule("sent_at", sent_at),
    rule("timestamp", timestamp),
];

/// Evaluate rules into `columns`. Blank results are omitted; objects and
/// arrays are stored as serialized JSON.
pub fn apply_rules(rules: &[Rule], ctx: &RuleContext<'_>, namer: &Namer<'_>, columns: &mut Columns) {
    for rule in rules {
        let Some(value) = (rule.resolve)(ctx) else {
            continue;
        };
        if is_blank(&value) {
            continue;
        }
        let (value, inferred) = typed(value);
        columns.insert(namer.column(rule.column), value, rule.forced.unwrap_or(inferred));
    }
}

/// Column value and type for a non-null value. Objects and arrays are
/// serialized.
pub(crate) fn typed(value: Value) -> (Value, ColumnType) {
    match value {
        Value::Object(_) | Value::Array(_) => (Value::String(value.to_string()), ColumnType::Json),
        scalar => {
            let ty = ColumnType::infer(&scalar).unwrap_or(ColumnType::String);
            (scalar, ty)
        }
    }
}

const COMMON_RESERVED: &[&str] = &[
    "id",
    "anonymous_id",
    "user_id",
    "sent_at",
    "timestamp",
    "received_at",
    "original_timestamp",
    "channel",
    "context_ip",
    "context_request_ip",
    "context_passed_ip",
    "uuid_ts",
    "loaded_at",
];

/// Columns owned by the pipeline for an event type, beyond the common set.
fn type_reserved(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::Track => &["event_text", "event", "record_id"],
        EventType::Page | EventType::Screen => &["name"],
        EventType::Group => &["group_id"],
        EventType::Alias => &["previous_id"],
        EventType::Identify | EventType::Extract | EventType::Merge => &[],
    }
}

pub(crate) fn is_reserved_for(event_type: EventType, column: &str) -> bool {
    let column = column.to_ascii_lowercase();
    match event_type {
        EventType::Extract => ["id", "received_at", "event"].contains(&column.as_str()),
        EventType::Merge => false,
        _ => {
            COMMON_RESERVED.contains(&column.as_str())
                || type_reserved(event_type).contains(&column.as_str())
        }
    }
}

/// Whether a column is reserved for the given event type. Unknown event types
/// reserve nothing.
pub fn is_reserved_column(event_type: &str, column: &str) -> bool {
    event_type
        .parse::<EventType>()
        .map(|t| is_reserved_for(t, column))
        .unwrap_or(false)
}

/// Validated record id from metadata.
pub fn record_id(metadata: &EventMetadata) -> Result<Value, EventError> {
    match &metadata.record_id {
        None | Some(Value::Null) => Err(EventError::RecordIdEmpty),
        Some(Value::String(s)) if s.is_empty() => Err(EventError::RecordIdEmpty),
        Some(Value::Object(_)) => Err(EventError::RecordIdObject),
        Some(id) => Ok(id.clone()),
    }
}

/// Record id for events from versioned cloud sources. Events without
/// `context.sources.version` get `fallback` unvalidated.
pub fn cloud_record_id(
    payload: &Value,
    metadata: &EventMetadata,
    fallback: Value,
) -> Result<Value, EventError> {
    if lookup(payload, &["context", "sources", "version"]).is_none() {
        return Ok(fallback);
    }
    record_id(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use serde_json::json;

    fn mandatory() -> MandatoryFields {
        MandatoryFields {
            message_id: json!("messageId"),
            received_at: "2021-09-01T00:00:00.000Z".into(),
        }
    }

    fn evaluate(rules: &[Rule], payload: Value, dialect: &str) -> Columns {
        let mandatory = mandatory();
        let ctx = RuleContext {
            payload: &payload,
            mandatory: &mandatory,
        };
        let namer = Namer::new(Dialect::lookup(dialect).unwrap(), false);
        let mut columns = Columns::new();
        apply_rules(rules, &ctx, &namer, &mut columns);
        columns
    }

    #[test]
    fn default_rules() {
        let columns = evaluate(
            DEFAULT_RULES,
            json!({
                "anonymousId": "anonymousId",
                "userId": "",
                "sentAt": "2021-09-01T00:00:00.000Z",
                "channel": "web"
            }),
            "POSTGRES",
        );

        assert_eq!(columns.get("id"), Some(&json!("messageId")));
        assert_eq!(columns.get("anonymous_id"), Some(&json!("anonymousId")));
        assert!(columns.get("user_id").is_none());
        assert!(columns.get("timestamp").is_none());
        assert_eq!(columns.column_type("sent_at"), Some(ColumnType::Datetime));
        assert_eq!(columns.column_type("received_at"), Some(ColumnType::Datetime));
        assert_eq!(columns.get("channel"), Some(&json!("web")));
    }

    #[test]
    fn ip_rules() {
        let both = evaluate(
            IP_RULES,
            json!({"context": {"ip": "1.2.3.4"}, "request_ip": "5.6.7.8"}),
            "POSTGRES",
        );
        assert_eq!(both.get("context_ip"), Some(&json!("1.2.3.4")));
        assert_eq!(both.get("context_passed_ip"), Some(&json!("1.2.3.4")));
        assert_eq!(both.get("context_request_ip"), Some(&json!("5.6.7.8")));

        let request_only = evaluate(IP_RULES, json!({"request_ip": "5.6.7.8"}), "POSTGRES");
        assert_eq!(request_only.get("context_ip"), Some(&json!("5.6.7.8")));
        assert!(request_only.get("context_passed_ip").is_none());
    }

    #[test]
    fn rule_columns_are_named_per_dialect() {
        let lake = evaluate(
            DEFAULT_RULES,
            json!({"timestamp": "2021-09-01T00:00:00.000Z"}),
            "S3_DATALAKE",
        );
        assert!(lake.get("_timestamp").is_some());

        let snowflake = evaluate(DEFAULT_RULES, json!({}), "SNOWFLAKE");
        assert!(snowflake.get("RECEIVED_AT").is_some());
    }

    #[test]
    fn structured_rule_values_are_serialized() {
        let columns = evaluate(DEFAULT_RULES, json!({"userId": {"a": 1}}), "POSTGRES");
        assert_eq!(columns.get("user_id"), Some(&json!("{\"a\":1}")));
        assert_eq!(columns.column_type("user_id"), Some(ColumnType::Json));
    }

    #[test]
    fn reserved_columns_per_type() {
        assert!(is_reserved_column("track", "event_text"));
        assert!(is_reserved_column("track", "UUID_TS"));
        assert!(!is_reserved_column("identify", "event_text"));
        assert!(is_reserved_column("page", "name"));
        assert!(is_reserved_column("group", "group_id"));
        assert!(is_reserved_column("alias", "previous_id"));
        assert!(is_reserved_column("extract", "event"));
        assert!(!is_reserved_column("extract", "anonymous_id"));
        assert!(!is_reserved_column("merge", "id"));
        assert!(!is_reserved_column("login", "id"));
    }

    #[test]
    fn record_id_validation() {
        let with = |id: Option<Value>| EventMetadata {
            record_id: id,
            ..Default::default()
        };
        assert_eq!(record_id(&with(None)), Err(EventError::RecordIdEmpty));
        assert_eq!(record_id(&with(Some(Value::Null))), Err(EventError::RecordIdEmpty));
        assert_eq!(record_id(&with(Some(json!("")))), Err(EventError::RecordIdEmpty));
        assert_eq!(
            record_id(&with(Some(json!({"id": 1})))),
            Err(EventError::RecordIdObject)
        );
        assert_eq!(record_id(&with(Some(json!(123)))), Ok(json!(123)));
        assert_eq!(record_id(&with(Some(json!("r1")))), Ok(json!("r1")));
    }

    #[test]
    fn cloud_record_id_needs_source_version() {
        let metadata = EventMetadata::default();
        assert_eq!(
            cloud_record_id(&json!({}), &metadata, Value::Null),
            Ok(Value::Null)
        );
        assert_eq!(
            cloud_record_id(
                &json!({"context": {"sources": {"version": "v1"}}}),
                &metadata,
                Value::Null
            ),
            Err(EventError::RecordIdEmpty)
        );
    }
}
