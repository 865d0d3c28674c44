//! Output rows and their wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::column::ColumnType;

/// Table-level metadata of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMetadata {
    pub table: String,
    pub columns: BTreeMap<String, ColumnType>,
    pub received_at: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_merge_rule: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_prop_one: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_prop_two: Option<Value>,
}

/// One flat, typed row destined for a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub data: Map<String, Value>,
    pub metadata: RowMetadata,
    /// Always empty; kept for wire compatibility.
    #[serde(default)]
    pub user_id: String,
}

impl Row {
    pub fn new(
        table: impl Into<String>,
        data: Map<String, Value>,
        columns: BTreeMap<String, ColumnType>,
        received_at: impl Into<String>,
    ) -> Self {
        Self {
            data,
            metadata: RowMetadata {
                table: table.into(),
                columns,
                received_at: received_at.into(),
                is_merge_rule: false,
                merge_prop_one: None,
                merge_prop_two: None,
            },
            user_id: String::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.metadata.table
    }

    pub fn is_merge_rule(&self) -> bool {
        self.metadata.is_merge_rule
    }

    /// Column type declared for a column.
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.metadata.columns.get(column).copied()
    }
}
