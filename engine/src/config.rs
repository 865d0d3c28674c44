//! Transformer-wide settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_COLUMNS_IN_EVENT: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformerConfig {
    /// Emit identity merge rows for eligible destinations
    pub enable_id_resolution: bool,
    /// Copy source and destination identifiers into `context`
    pub populate_src_dest_info_in_context: bool,
    /// Column budget per row, ignored for datalakes
    pub max_columns_in_event: usize,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            enable_id_resolution: false,
            populate_src_dest_info_in_context: true,
            max_columns_in_event: DEFAULT_MAX_COLUMNS_IN_EVENT,
        }
    }
}
