//! Edge case tests for whrow-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use whrow_engine::{
    ColumnType, DestinationConfig, Error, EventError, EventMetadata, Hooks, IncomingEvent,
    TransformResult, Transformer, TransformerConfig,
};

fn hooks() -> Hooks {
    Hooks::default()
        .with_clock(|| Utc.with_ymd_and_hms(2023, 1, 1, 1, 0, 0).unwrap())
        .with_uuid(|| "c0ffee00-0000-4000-8000-000000000000".to_string())
}

fn event(payload: Value, destination_type: &str) -> IncomingEvent {
    let event_type = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    IncomingEvent::new(
        payload,
        EventMetadata {
            event_type,
            destination_type: destination_type.to_string(),
            ..Default::default()
        },
        DestinationConfig {
            destination_type: destination_type.to_string(),
            ..Default::default()
        },
    )
}

fn run(events: &[IncomingEvent]) -> TransformResult {
    Transformer::new(TransformerConfig::default())
        .with_hooks(hooks())
        .transform(events)
        .unwrap()
}

// ============================================================================
// Mandatory Fields
// ============================================================================

#[test]
fn mandatory_fields_from_payload() {
    let result = run(&[event(
        json!({"type": "page", "messageId": "messageId", "receivedAt": "2021-09-01T00:00:00.000Z"}),
        "POSTGRES",
    )]);
    let row = &result.events[0].output;
    assert_eq!(row.data["id"], json!("messageId"));
    assert_eq!(row.data["received_at"], json!("2021-09-01T00:00:00.000Z"));
    assert_eq!(row.metadata.received_at, "2021-09-01T00:00:00.000Z");
}

#[test]
fn mandatory_fields_generated_when_missing() {
    for payload in [
        json!({"type": "page"}),
        json!({"type": "page", "messageId": "", "receivedAt": ""}),
        json!({"type": "page", "messageId": null, "receivedAt": null}),
    ] {
        let result = run(&[event(payload, "POSTGRES")]);
        let row = &result.events[0].output;
        assert_eq!(
            row.data["id"],
            json!("auto-c0ffee00-0000-4000-8000-000000000000")
        );
        assert_eq!(row.data["received_at"], json!("2023-01-01T01:00:00.000Z"));
        assert_eq!(row.column_type("received_at"), Some(ColumnType::Datetime));
    }
}

#[test]
fn mandatory_fields_from_metadata() {
    let mut input = event(json!({"type": "page"}), "POSTGRES");
    input.metadata.message_id = Some("metaId".into());
    input.metadata.received_at = Some("2022-02-02T00:00:00.000Z".into());

    let result = run(&[input.clone()]);
    let transformed = &result.events[0];
    assert_eq!(transformed.output.data["id"], json!("metaId"));
    assert_eq!(
        transformed.output.data["received_at"],
        json!("2022-02-02T00:00:00.000Z")
    );
    assert_eq!(transformed.metadata, input.metadata);
}

#[test]
fn default_clock_and_uuid_are_used_without_hooks() {
    let result = Transformer::default()
        .transform(&[event(json!({"type": "page"}), "POSTGRES")])
        .unwrap();
    let row = &result.events[0].output;
    assert!(row.data["id"].as_str().unwrap().starts_with("auto-"));
    assert!(row.data["received_at"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// Naming Edge Cases
// ============================================================================

#[test]
fn colliding_keys_respect_sorter() {
    let payload = json!({
        "type": "page",
        "properties": {"abC": "first", "ab_C": "second", "ab_c": "third"}
    });

    let result = run(&[event(payload.clone(), "POSTGRES")]);
    assert_eq!(result.events[0].output.data["ab_c"], json!("third"));

    let reversed = hooks().with_sorter(|keys: &mut [String]| {
        keys.sort();
        keys.reverse();
    });
    let result = Transformer::default()
        .with_hooks(reversed)
        .transform(&[event(payload, "POSTGRES")])
        .unwrap();
    assert_eq!(result.events[0].output.data["ab_c"], json!("first"));
}

#[test]
fn user_keys_never_override_rule_columns() {
    let payload = json!({
        "type": "page",
        "messageId": "messageId",
        "properties": {"id": "spoofed", "received_at": "spoofed", "uuid_ts": "spoofed"}
    });
    let result = run(&[event(payload, "POSTGRES")]);
    let row = &result.events[0].output;
    assert_eq!(row.data["id"], json!("messageId"));
    assert_ne!(row.data["received_at"], json!("spoofed"));
    assert!(row.data.get("uuid_ts").is_none());
}

#[test]
fn unicode_and_symbol_keys() {
    let payload = json!({
        "type": "page",
        "properties": {"Prénom": "Zoë", "$$$": "dropped", "1st place": true, "": "empty"}
    });
    let result = run(&[event(payload, "POSTGRES")]);
    let data = &result.events[0].output.data;
    assert_eq!(data["prénom"], json!("Zoë"));
    assert_eq!(data["_1st_place"], json!(true));
    assert!(data.values().all(|v| v != &json!("dropped") && v != &json!("empty")));
}

#[test]
fn long_keys_are_truncated_per_dialect() {
    let key = "k".repeat(200);
    let payload = json!({"type": "page", "properties": {key.clone(): 1}});

    let pg = run(&[event(payload.clone(), "POSTGRES")]);
    assert!(pg.events[0].output.data.contains_key(&"k".repeat(63)));

    let bq = run(&[event(payload, "BQ")]);
    assert!(bq.events[0].output.data.contains_key(&"k".repeat(127)));
}

#[test]
fn snowflake_uppercases_every_name() {
    let payload = json!({"type": "track", "event": "Order Completed", "properties": {"total": 10}});
    let result = run(&[event(payload, "SNOWFLAKE")]);
    let rows: Vec<_> = result.events.iter().map(|e| &e.output).collect();
    assert_eq!(rows[0].table(), "TRACKS");
    assert_eq!(rows[1].table(), "ORDER_COMPLETED");
    assert_eq!(rows[1].data["TOTAL"], json!(10));
    assert_eq!(rows[1].data["EVENT"], json!("ORDER_COMPLETED"));
    assert_eq!(rows[1].column_type("UUID_TS"), Some(ColumnType::Datetime));
    assert!(rows[1].data.keys().all(|k| k.to_uppercase() == *k));
}

#[test]
fn datalake_escapes_timestamp() {
    let payload = json!({
        "type": "page",
        "timestamp": "2021-09-01T00:00:00.000Z",
        "properties": {"timestamp": "user value"}
    });
    let result = run(&[event(payload.clone(), "S3_DATALAKE")]);
    let row = &result.events[0].output;
    assert_eq!(row.data["_timestamp"], json!("2021-09-01T00:00:00.000Z"));
    assert!(row.data.get("timestamp").is_none());

    let mut skipping = event(payload, "GCS_DATALAKE");
    skipping
        .destination_config
        .config
        .insert("skipReservedKeywordsEscaping".into(), json!(true));
    let result = run(&[skipping]);
    assert_eq!(
        result.events[0].output.data["timestamp"],
        json!("2021-09-01T00:00:00.000Z")
    );
}

// ============================================================================
// Value Edge Cases
// ============================================================================

#[test]
fn number_typing() {
    let payload = json!({
        "type": "page",
        "properties": {"whole": 3.0, "fraction": 3.5, "negative": -7, "big": 9007199254740993u64}
    });
    let result = run(&[event(payload, "POSTGRES")]);
    let row = &result.events[0].output;
    assert_eq!(row.column_type("whole"), Some(ColumnType::Int));
    assert_eq!(row.data["whole"], json!(3.0));
    assert_eq!(row.column_type("fraction"), Some(ColumnType::Float));
    assert_eq!(row.column_type("negative"), Some(ColumnType::Int));
    assert_eq!(row.column_type("big"), Some(ColumnType::Int));
}

#[test]
fn timestamps_and_lookalikes() {
    let payload = json!({
        "type": "page",
        "properties": {
            "date": "2021-09-01",
            "spaced": "2021-09-01 10:11:12",
            "version": "1.2.3",
            "phone": "+1-202-555-0146"
        }
    });
    let result = run(&[event(payload, "POSTGRES")]);
    let row = &result.events[0].output;
    assert_eq!(row.column_type("date"), Some(ColumnType::Datetime));
    assert_eq!(row.column_type("spaced"), Some(ColumnType::Datetime));
    assert_eq!(row.column_type("version"), Some(ColumnType::String));
    assert_eq!(row.column_type("phone"), Some(ColumnType::String));
}

#[test]
fn nested_arrays_and_empty_objects() {
    let payload = json!({
        "type": "page",
        "properties": {"items": [{"sku": "a"}, {"sku": "b"}], "empty": {}, "nested": {"deeper": {}}}
    });
    let result = run(&[event(payload, "POSTGRES")]);
    let row = &result.events[0].output;
    assert_eq!(row.data["items"], json!("[{\"sku\":\"a\"},{\"sku\":\"b\"}]"));
    assert_eq!(row.column_type("items"), Some(ColumnType::Json));
    assert!(row.data.get("empty").is_none());
    assert!(row.data.get("nested").is_none());
}

#[test]
fn cloud_sources_stop_at_depth() {
    let mut input = event(
        json!({"type": "track", "event": "e", "properties": {"a": {"b": {"c": {"d": {"e": 1}}}}}}),
        "POSTGRES",
    );
    input.metadata.source_category = Some("cloud".into());
    let result = run(&[input]);
    let row = &result.events[1].output;
    assert_eq!(row.data["a_b_c_d"], json!("{\"e\":1}"));
}

#[test]
fn non_object_context_is_left_alone() {
    let payload = json!({"type": "page", "context": "mobile"});
    let result = run(&[event(payload, "POSTGRES")]);
    assert!(result.failed_events.is_empty());
    assert!(result.events[0]
        .output
        .data
        .keys()
        .all(|k| !k.starts_with("context_")));
}

// ============================================================================
// Batch Behavior
// ============================================================================

#[test]
fn rows_follow_input_order() {
    let result = run(&[
        event(json!({"type": "screen"}), "POSTGRES"),
        event(json!({"type": "merge"}), "POSTGRES"),
        event(json!({"type": "page"}), "POSTGRES"),
        event(json!({"type": "unknown"}), "POSTGRES"),
        event(json!({"type": "group"}), "POSTGRES"),
    ]);
    let tables: Vec<_> = result.events.iter().map(|e| e.output.table()).collect();
    assert_eq!(tables, ["screens", "pages", "groups"]);
    assert_eq!(result.failed_events.len(), 1);
    assert_eq!(
        result.failed_events[0].error,
        EventError::UnsupportedEventType("unknown".into())
    );
}

#[test]
fn event_type_falls_back_to_payload() {
    let mut input = event(json!({"type": "page"}), "POSTGRES");
    input.metadata.event_type.clear();
    let result = run(&[input]);
    assert_eq!(result.events[0].output.table(), "pages");
}

#[test]
fn destination_type_falls_back_to_metadata() {
    let mut input = event(json!({"type": "page"}), "BQ");
    input.destination_config.destination_type.clear();
    let result = run(&[input]);
    assert_eq!(
        result.events[0].output.data["context_destination_type"],
        json!("BQ")
    );
}

#[test]
fn unknown_destination_rejects_batch() {
    let err = Transformer::default()
        .transform(&[
            event(json!({"type": "page"}), "POSTGRES"),
            event(json!({"type": "page"}), "ORACLE"),
        ])
        .unwrap_err();
    assert_eq!(err, Error::UnknownDestination("ORACLE".into()));
    assert_eq!(err.to_string(), "unknown destination type: ORACLE");
}

#[test]
fn empty_batch() {
    let result = run(&[]);
    assert!(result.events.is_empty());
    assert!(result.failed_events.is_empty());
}

#[test]
fn output_is_byte_identical_across_runs() {
    let payload = json!({
        "type": "identify",
        "userId": "u1",
        "traits": {"z": 1, "a": {"b": [1, 2]}, "m": "2021-09-01"},
        "context": {"ip": "1.2.3.4", "library": {"name": "http"}}
    });
    let first = serde_json::to_string(&run(&[event(payload.clone(), "RS")])).unwrap();
    let second = serde_json::to_string(&run(&[event(payload, "RS")])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn result_wire_shape() {
    let result = run(&[
        event(json!({"type": "page", "messageId": "m1"}), "POSTGRES"),
        event(json!({"type": "login"}), "POSTGRES"),
    ]);
    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["events"][0]["statusCode"], json!(200));
    assert_eq!(wire["events"][0]["metadata"]["eventType"], json!("page"));
    assert_eq!(wire["events"][0]["output"]["userId"], json!(""));
    assert_eq!(
        wire["failedEvents"][0]["error"],
        json!("unsupported event type: login")
    );
    assert_eq!(wire["failedEvents"][0]["errorKind"], json!("UnsupportedEventType"));
    assert_eq!(wire["failedEvents"][0]["statusCode"], json!(400));
}

#[test]
fn merge_failures_with_the_same_message_differ_by_kind() {
    let config = TransformerConfig {
        enable_id_resolution: true,
        ..Default::default()
    };
    let batch = [
        event(json!({"type": "merge", "mergeProperties": [1, {"type": "a", "value": "b"}]}), "BQ"),
        event(json!({"type": "merge", "mergeProperties": [{"type": "a", "value": "b"}, 2]}), "BQ"),
        event(json!({"type": "merge", "mergeProperties": [{"type": "a"}, {"type": "a", "value": "b"}]}), "BQ"),
    ];
    let result = Transformer::new(config).transform(&batch).unwrap();
    let wire = serde_json::to_value(&result).unwrap();

    let failed = wire["failedEvents"].as_array().unwrap();
    let messages: Vec<&Value> = failed.iter().map(|f| &f["error"]).collect();
    assert!(messages.iter().all(|m| *m == &failed[0]["error"]));
    let kinds: Vec<&str> = failed.iter().map(|f| f["errorKind"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        ["MergePropertyOneInvalid", "MergePropertyTwoInvalid", "MergePropertyEmpty"]
    );
}
