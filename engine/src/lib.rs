//! # whrow Engine
//!
//! Turns semi-structured analytics events into flat, typed warehouse rows.
//!
//! The engine is a small compiler: nested JSON payloads are flattened into
//! deterministic column sets, column types are inferred, keys are normalized
//! into warehouse identifiers and per-destination dialect quirks are applied.
//! The same event always produces byte-identical output.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine knows nothing about transports, files or config services
//! - **Deterministic**: Clock, uuid and key order are injected through [`Hooks`]
//! - **Per-event failure**: One bad event never aborts its batch
//! - **Data-driven dialects**: Warehouse differences live in [`Dialect`] descriptors
//!
//! ## Core Concepts
//!
//! ### Events
//!
//! An [`IncomingEvent`] carries a payload, [`EventMetadata`] and a
//! [`DestinationConfig`]. The event type is one of [`EventType`]:
//! identify, track, page, screen, group, alias, extract or merge.
//!
//! ### Rows
//!
//! Every event produces zero or more [`Row`]s. A row names its table, carries
//! its data and declares a [`ColumnType`] per column. Identity merge rules are
//! rows with `isMergeRule` set.
//!
//! ### Dialects
//!
//! [`Dialect::lookup`] maps a destination type such as `POSTGRES`, `BQ` or
//! `SNOWFLAKE` to its casing, identifier limit, reserved keywords, metadata
//! columns and identity resolution support.
//!
//! ## Quick Start
//!
//! ```rust
//! use whrow_engine::{IncomingEvent, Transformer, TransformerConfig};
//! use serde_json::json;
//!
//! let event: IncomingEvent = serde_json::from_value(json!({
//!     "payload": {
//!         "type": "track",
//!         "event": "Order Completed",
//!         "messageId": "m1",
//!         "receivedAt": "2021-09-01T00:00:00.000Z",
//!         "properties": {"revenue": 42.5}
//!     },
//!     "metadata": {"destinationType": "POSTGRES"},
//!     "destinationConfig": {}
//! }))
//! .unwrap();
//!
//! let result = Transformer::new(TransformerConfig::default())
//!     .transform(&[event])
//!     .unwrap();
//!
//! let tables: Vec<_> = result.events.iter().map(|e| e.output.table()).collect();
//! assert_eq!(tables, ["tracks", "order_completed"]);
//! ```

pub mod column;
pub mod config;
pub mod dialect;
pub mod error;
pub mod event;
pub mod flatten;
mod handlers;
pub mod hooks;
pub mod mandatory;
pub mod naming;
pub mod options;
pub mod row;
pub mod rules;
pub mod transformer;

// Re-export main types at crate root
pub use column::ColumnType;
pub use config::TransformerConfig;
pub use dialect::Dialect;
pub use error::{Error, EventError, Result};
pub use event::{DestinationConfig, EventMetadata, EventType, IncomingEvent};
pub use hooks::Hooks;
pub use mandatory::MandatoryFields;
pub use naming::{to_snake_case, Namer};
pub use options::{EventOptions, JsonPaths};
pub use row::{Row, RowMetadata};
pub use rules::{cloud_record_id, is_reserved_column, record_id};
pub use transformer::{FailedEvent, TransformResult, TransformedEvent, Transformer};
