//! merge: explicit identity merge between two identifiers.

use serde_json::{Map, Value};

use super::{EventContext, HandlerResult};
use crate::error::EventError;
use crate::event::{is_blank, value_to_string};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    if !ctx.merge_enabled() {
        return Ok(Vec::new());
    }
    let [(type_one, value_one), (type_two, value_two)] = merge_properties(ctx.payload)?;
    Ok(vec![ctx.merge_row(
        (type_one.as_str(), value_one),
        Some((type_two.as_str(), value_two)),
    )])
}

/// Validate `mergeProperties` and return both (type, value) pairs.
fn merge_properties(payload: &Value) -> Result<[(String, Value); 2], EventError> {
    let properties = match payload.get("mergeProperties") {
        None | Some(Value::Null) => return Err(EventError::MergePropertiesMissing),
        Some(properties) => properties,
    };
    let items = properties
        .as_array()
        .ok_or(EventError::MergePropertiesNotArray)?;
    if items.len() != 2 {
        return Err(EventError::MergePropertiesNotSufficient);
    }

    let one = items[0]
        .as_object()
        .ok_or(EventError::MergePropertyOneInvalid)?;
    let two = items[1]
        .as_object()
        .ok_or(EventError::MergePropertyTwoInvalid)?;

    Ok([property(one)?, property(two)?])
}

fn property(item: &Map<String, Value>) -> Result<(String, Value), EventError> {
    match (item.get("type"), item.get("value")) {
        (Some(kind), Some(value)) if !is_blank(kind) && !is_blank(value) => {
            Ok((value_to_string(kind), value.clone()))
        }
        _ => Err(EventError::MergePropertyEmpty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_order() {
        let cases = [
            (json!({}), EventError::MergePropertiesMissing),
            (json!({"mergeProperties": null}), EventError::MergePropertiesMissing),
            (json!({"mergeProperties": "invalid"}), EventError::MergePropertiesNotArray),
            (json!({"mergeProperties": []}), EventError::MergePropertiesNotSufficient),
            (
                json!({"mergeProperties": [{"type": "email", "value": "a"}]}),
                EventError::MergePropertiesNotSufficient,
            ),
            (
                json!({"mergeProperties": [{}, {}, {}]}),
                EventError::MergePropertiesNotSufficient,
            ),
            (
                json!({"mergeProperties": ["invalid", "invalid"]}),
                EventError::MergePropertyOneInvalid,
            ),
            (
                json!({"mergeProperties": [{"type": "email", "value": "a"}, "invalid"]}),
                EventError::MergePropertyTwoInvalid,
            ),
            (
                json!({"mergeProperties": [
                    {"type1": "email", "value1": "a"},
                    {"type1": "mobile", "value1": "b"}
                ]}),
                EventError::MergePropertyEmpty,
            ),
            (
                json!({"mergeProperties": [
                    {"type": "email", "value": "a"},
                    {"type": "mobile", "value": ""}
                ]}),
                EventError::MergePropertyEmpty,
            ),
        ];

        for (payload, expected) in cases {
            assert_eq!(merge_properties(&payload).unwrap_err(), expected, "{payload}");
        }
    }

    #[test]
    fn values_are_kept_verbatim() {
        let payload = json!({"mergeProperties": [
            {"type": "email", "value": "alex@example.com"},
            {"type": "customer_no", "value": 1042}
        ]});
        let [one, two] = merge_properties(&payload).unwrap();
        assert_eq!(one, ("email".to_string(), json!("alex@example.com")));
        assert_eq!(two, ("customer_no".to_string(), json!(1042)));
    }
}
