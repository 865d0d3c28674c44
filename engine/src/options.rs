//! Per-event options resolved from the destination config and the payload's
//! `integrations` overrides.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::event::{EventMetadata, EventType};

const DATA_WAREHOUSE: &str = "DATA_WAREHOUSE";

/// Configured stop paths: objects at these paths are serialized whole.
///
/// A path is stored as its parts joined with `_` together with its depth.
/// Paths whose first part names an event type are fully qualified, every other
/// path is a legacy path relative to a flattened sub-object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPaths {
    qualified: BTreeSet<(String, usize)>,
    legacy: BTreeSet<(String, usize)>,
}

impl JsonPaths {
    /// Build from dotted paths such as `track.properties.location`.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut json_paths = Self::default();
        for path in paths {
            json_paths.insert(path);
        }
        json_paths
    }

    fn insert(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        let parts: Vec<&str> = path.split('.').collect();
        let entry = (parts.join("_"), parts.len() - 1);
        if parts[0].parse::<EventType>().is_ok() {
            self.qualified.insert(entry);
        } else {
            self.legacy.insert(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty() && self.legacy.is_empty()
    }

    /// Whether the object at a flattened position should stop recursion.
    ///
    /// `complete_key` starts with the event type and is checked against fully
    /// qualified paths. Legacy paths apply to track events only and are checked
    /// against `relative_key`.
    pub fn matches(
        &self,
        event_type: EventType,
        complete_key: &str,
        complete_level: usize,
        relative_key: &str,
        relative_level: usize,
    ) -> bool {
        if self
            .qualified
            .contains(&(complete_key.to_string(), complete_level))
        {
            return true;
        }
        event_type == EventType::Track
            && self
                .legacy
                .contains(&(relative_key.to_string(), relative_level))
    }
}

/// Options that shape how a single event is transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOptions {
    pub store_full_event: bool,
    pub allow_users_context_traits: bool,
    pub skip_users_table: bool,
    pub skip_tracks_table: bool,
    pub skip_reserved_keywords_escaping: bool,
    /// Event originates from a cloud source
    pub cloud: bool,
    pub json_paths: JsonPaths,
}

impl EventOptions {
    /// Resolve the options for one event.
    ///
    /// Fails only when the legacy `jsonPaths` destination option is not a
    /// string.
    pub fn resolve(
        payload: &Value,
        metadata: &EventMetadata,
        config: &Map<String, Value>,
        destination_type: &str,
    ) -> Result<Self> {
        let dest_options = integration_options(payload, destination_type);
        let warehouse_options = integration_options(payload, DATA_WAREHOUSE);

        let from_either = |key: &str| {
            flag(config.get(key)) || flag(dest_options.and_then(|o| o.get(key)))
        };

        let mut paths: Vec<&str> = Vec::new();
        for options in [dest_options, warehouse_options].into_iter().flatten() {
            if let Some(Value::Array(items)) = options.get("jsonPaths") {
                paths.extend(items.iter().filter_map(Value::as_str));
            }
        }
        let legacy = legacy_json_paths(config)?;
        paths.extend(legacy.split(','));

        Ok(Self {
            store_full_event: flag(config.get("storeFullEvent")),
            allow_users_context_traits: flag(config.get("allowUsersContextTraits")),
            skip_users_table: from_either("skipUsersTable"),
            skip_tracks_table: from_either("skipTracksTable"),
            skip_reserved_keywords_escaping: from_either("skipReservedKeywordsEscaping"),
            cloud: metadata.source_category.as_deref() == Some("cloud"),
            json_paths: JsonPaths::from_paths(paths),
        })
    }
}

/// The destination-level comma separated `jsonPaths` option.
pub fn legacy_json_paths(config: &Map<String, Value>) -> Result<&str> {
    match config.get("jsonPaths") {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(paths)) => Ok(paths),
        Some(other) => Err(Error::InvalidConfig(format!(
            "jsonPaths must be a string, got {other}"
        ))),
    }
}

fn integration_options<'a>(payload: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    payload
        .get("integrations")?
        .get(name)?
        .get("options")?
        .as_object()
}

/// Boolean option value, accepting string-encoded booleans.
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
