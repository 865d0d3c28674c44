//! extract: cloud source records keyed by their record id.

use serde_json::Value;

use super::{EventContext, HandlerResult};
use crate::column::ColumnType;
use crate::error::EventError;
use crate::event::value_to_string;
use crate::flatten::Columns;
use crate::rules::{record_id, typed};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    let record_id = record_id(ctx.metadata)?;

    let event = ctx.field("event").map(value_to_string).unwrap_or_default();
    let table = ctx.namer.event_table(&event);
    if table.is_empty() {
        return Err(EventError::ExtractEventNameEmpty);
    }

    let mut columns = Columns::new();
    ctx.flatten_field(&mut columns, "properties");
    ctx.flatten_context(&mut columns);

    let (id, ty) = typed(record_id);
    columns.insert(ctx.column("id"), id, ty);
    columns.insert(
        ctx.column("received_at"),
        Value::String(ctx.mandatory.received_at.clone()),
        ColumnType::Datetime,
    );
    columns.insert(
        ctx.column("event"),
        Value::String(ctx.namer.table_value(&event)),
        ColumnType::String,
    );

    Ok(vec![ctx.row(table, columns)])
}
