//! Flattening of nested payload objects into typed columns.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::column::ColumnType;
use crate::event::{is_blank, EventType};
use crate::hooks::KeySorter;
use crate::naming::{to_snake_case, Namer};
use crate::options::JsonPaths;
use crate::rules::is_reserved_for;

/// Relative depth at which cloud source objects are serialized whole.
const CLOUD_MAX_LEVEL: usize = 3;

/// Column values and their declared types, kept in lockstep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    data: Map<String, Value>,
    types: BTreeMap<String, ColumnType>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value and type.
    pub fn insert(&mut self, name: impl Into<String>, value: Value, ty: ColumnType) {
        let name = name.into();
        self.types.insert(name.clone(), ty);
        self.data.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.types.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy every column of `other` over this set.
    pub fn extend(&mut self, other: &Columns) {
        for (name, value) in &other.data {
            if let Some(ty) = other.types.get(name) {
                self.insert(name.clone(), value.clone(), *ty);
            }
        }
    }

    pub fn into_parts(self) -> (Map<String, Value>, BTreeMap<String, ColumnType>) {
        (self.data, self.types)
    }
}

/// Position of an object inside the event, used for jsonPaths matching and
/// for naming the columns it produces.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Path from the event root, starting with the event type
    complete_prefix: String,
    complete_level: usize,
    /// Path from the flattened sub-object; doubles as the column prefix
    relative_prefix: String,
    relative_level: usize,
}

impl Scope {
    /// A top-level payload field flattened without column prefix, such as
    /// `properties` or `traits`.
    pub fn field(event_type: EventType, field: &str) -> Self {
        Self {
            complete_prefix: format!("{event_type}_{field}_"),
            complete_level: 2,
            relative_prefix: String::new(),
            relative_level: 0,
        }
    }

    /// The `context` object, whose columns carry a `context_` prefix.
    pub fn context(event_type: EventType) -> Self {
        Self {
            complete_prefix: format!("{event_type}_context_"),
            complete_level: 2,
            relative_prefix: "context_".to_string(),
            relative_level: 1,
        }
    }

    /// `context.traits` merged into user rows without prefix.
    pub fn context_traits(event_type: EventType) -> Self {
        Self {
            complete_prefix: format!("{event_type}_context_traits_"),
            complete_level: 3,
            relative_prefix: String::new(),
            relative_level: 0,
        }
    }

    fn child(&self, key: &str) -> Self {
        Self {
            complete_prefix: format!("{}{key}_", self.complete_prefix),
            complete_level: self.complete_level + 1,
            relative_prefix: format!("{}{key}_", self.relative_prefix),
            relative_level: self.relative_level + 1,
        }
    }
}

/// Walks payload objects for one event and emits columns.
pub struct Flattener<'a> {
    pub(crate) namer: Namer<'a>,
    pub(crate) event_type: EventType,
    pub(crate) json_paths: &'a JsonPaths,
    pub(crate) sorter: &'a KeySorter,
    pub(crate) cloud: bool,
}

impl<'a> Flattener<'a> {
    pub fn new(
        namer: Namer<'a>,
        event_type: EventType,
        json_paths: &'a JsonPaths,
        sorter: &'a KeySorter,
        cloud: bool,
    ) -> Self {
        Self {
            namer,
            event_type,
            json_paths,
            sorter,
            cloud,
        }
    }

    /// Flatten `value` into `columns`. Non-object values produce nothing.
    pub fn flatten(&self, columns: &mut Columns, value: Option<&Value>, scope: &Scope) {
        if let Some(Value::Object(object)) = value {
            self.flatten_object(columns, object, scope);
        }
    }

    fn flatten_object(&self, columns: &mut Columns, object: &Map<String, Value>, scope: &Scope) {
        let mut keys: Vec<String> = object.keys().cloned().collect();
        (self.sorter)(&mut keys);

        for key in &keys {
            let Some(value) = object.get(key) else {
                continue;
            };
            if is_blank(value) {
                continue;
            }

            let complete_key = format!("{}{key}", scope.complete_prefix);
            let relative_key = format!("{}{key}", scope.relative_prefix);

            let stop = self.json_paths.matches(
                self.event_type,
                &complete_key,
                scope.complete_level,
                &relative_key,
                scope.relative_level,
            );
            if stop {
                self.put(columns, &relative_key, Value::String(value.to_string()), ColumnType::Json);
                continue;
            }

            match value {
                Value::Object(child)
                    if !(self.cloud && scope.relative_level >= CLOUD_MAX_LEVEL) =>
                {
                    self.flatten_object(columns, child, &scope.child(key));
                }
                Value::Object(_) | Value::Array(_) => {
                    self.put(columns, &relative_key, Value::String(value.to_string()), ColumnType::Json);
                }
                scalar => {
                    if let Some(ty) = ColumnType::infer(scalar) {
                        self.put(columns, &relative_key, scalar.clone(), ty);
                    }
                }
            }
        }
    }

    fn put(&self, columns: &mut Columns, key: &str, value: Value, ty: ColumnType) {
        let name = self.namer.column(key);
        // Escaping turns `timestamp` into `_timestamp` on some dialects.
        if name.is_empty()
            || is_reserved_for(self.event_type, &name)
            || is_reserved_for(self.event_type, &to_snake_case(key))
        {
            return;
        }
        columns.insert(name, value, ty);
    }
}
