//! Per-event-type row recipes.
//!
//! Each handler is a pure function from an [`EventContext`] to the ordered
//! rows of one event. Shared steps such as flattening a payload field, applying
//! rules and building merge rows live on the context.

mod alias;
mod extract;
mod group;
mod identify;
mod merge;
mod page;
mod track;

use serde_json::Value;

use crate::column::ColumnType;
use crate::config::TransformerConfig;
use crate::dialect::{Dialect, MERGE_RULES_TABLE};
use crate::error::EventError;
use crate::event::{lookup, EventMetadata, EventType};
use crate::flatten::{Columns, Flattener, Scope};
use crate::hooks::Hooks;
use crate::mandatory::MandatoryFields;
use crate::naming::Namer;
use crate::options::EventOptions;
use crate::row::Row;
use crate::rules::{apply_rules, Rule, RuleContext};

pub type HandlerResult = Result<Vec<Row>, EventError>;

/// Everything a handler may read about one event.
pub struct EventContext<'a> {
    /// Payload after context enrichment
    pub payload: &'a Value,
    pub metadata: &'a EventMetadata,
    pub event_type: EventType,
    pub dialect: &'static Dialect,
    pub namer: Namer<'static>,
    pub options: &'a EventOptions,
    pub mandatory: MandatoryFields,
    pub config: &'a TransformerConfig,
    pub hooks: &'a Hooks,
}

/// Produce the rows for one event.
pub fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    match ctx.event_type {
        EventType::Identify => identify::handle(ctx),
        EventType::Track => track::handle(ctx),
        EventType::Page => page::handle(ctx, "pages"),
        EventType::Screen => page::handle(ctx, "screens"),
        EventType::Group => group::handle(ctx),
        EventType::Alias => alias::handle(ctx),
        EventType::Extract => extract::handle(ctx),
        EventType::Merge => merge::handle(ctx),
    }
}

impl<'a> EventContext<'a> {
    fn flattener(&self) -> Flattener<'_> {
        Flattener::new(
            self.namer,
            self.event_type,
            &self.options.json_paths,
            &self.hooks.sorter,
            self.options.cloud,
        )
    }

    /// Flatten a top-level payload field without column prefix.
    pub(crate) fn flatten_field(&self, columns: &mut Columns, field: &str) {
        let scope = Scope::field(self.event_type, field);
        self.flattener()
            .flatten(columns, self.payload.get(field), &scope);
    }

    /// Flatten `context` into `context_` prefixed columns.
    pub(crate) fn flatten_context(&self, columns: &mut Columns) {
        let scope = Scope::context(self.event_type);
        self.flattener()
            .flatten(columns, self.payload.get("context"), &scope);
    }

    /// Flatten `context.traits` without prefix.
    pub(crate) fn flatten_context_traits(&self, columns: &mut Columns) {
        let traits = self.payload.get("context").and_then(|c| c.get("traits"));
        let scope = Scope::context_traits(self.event_type);
        self.flattener().flatten(columns, traits, &scope);
    }

    pub(crate) fn apply(&self, rules: &[Rule], columns: &mut Columns) {
        let ctx = RuleContext {
            payload: self.payload,
            mandatory: &self.mandatory,
        };
        apply_rules(rules, &ctx, &self.namer, columns);
    }

    /// Column name in the destination's dialect.
    pub(crate) fn column(&self, name: &str) -> String {
        self.namer.column(name)
    }

    /// Non-blank top-level payload value.
    pub(crate) fn field(&self, key: &str) -> Option<&'a Value> {
        lookup(self.payload, &[key])
    }

    /// Store the enriched event as `rudder_event` when configured.
    pub(crate) fn store_full_event(&self, columns: &mut Columns) {
        if self.options.store_full_event {
            columns.insert(
                self.column("rudder_event"),
                Value::String(self.payload.to_string()),
                ColumnType::Json,
            );
        }
    }

    /// Finish a regular row, declaring the dialect's metadata columns.
    pub(crate) fn row(&self, table: String, columns: Columns) -> Row {
        let (data, mut types) = columns.into_parts();
        for column in self.dialect.metadata_columns() {
            types.insert(
                self.dialect.apply_case(column.to_string()),
                ColumnType::Datetime,
            );
        }
        Row::new(table, data, types, self.mandatory.received_at.clone())
    }

    pub(crate) fn merge_enabled(&self) -> bool {
        self.config.enable_id_resolution && self.dialect.id_resolution
    }

    /// Identity merge row for one or two (type, value) properties.
    pub(crate) fn merge_row(&self, one: (&str, Value), two: Option<(&str, Value)>) -> Row {
        let mut columns = Columns::new();
        let mut put = |n: u8, (kind, value): (&str, Value)| {
            columns.insert(
                self.column(&format!("merge_property_{n}_type")),
                Value::String(kind.to_string()),
                ColumnType::String,
            );
            columns.insert(
                self.column(&format!("merge_property_{n}_value")),
                value,
                ColumnType::String,
            );
        };

        let prop_one = one.1.clone();
        put(1, one);
        let prop_two = two.map(|two| {
            let value = two.1.clone();
            put(2, two);
            value
        });

        let (data, types) = columns.into_parts();
        let mut row = Row::new(
            self.namer.table(MERGE_RULES_TABLE),
            data,
            types,
            self.mandatory.received_at.clone(),
        );
        row.metadata.is_merge_rule = true;
        row.metadata.merge_prop_one = Some(prop_one);
        row.metadata.merge_prop_two = prop_two;
        row
    }

    /// Merge row from the non-blank ones of two identifiers, if enabled.
    pub(crate) fn identity_merge_row(
        &self,
        first: (&str, Option<&Value>),
        second: (&str, Option<&Value>),
    ) -> Option<Row> {
        if !self.merge_enabled() {
            return None;
        }
        let mut props = [first, second]
            .into_iter()
            .filter_map(|(kind, value)| value.map(|v| (kind, v.clone())));
        let one = props.next()?;
        Some(self.merge_row(one, props.next()))
    }

    /// Merge row pairing the anonymous id with the user id.
    pub(crate) fn default_merge_row(&self) -> Option<Row> {
        self.identity_merge_row(
            ("anonymous_id", self.field("anonymousId")),
            ("user_id", self.field("userId")),
        )
    }
}

