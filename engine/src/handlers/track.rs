//! track: `tracks`, the event's own table, then the merge row.

use serde_json::Value;

use super::{EventContext, HandlerResult};
use crate::column::ColumnType;
use crate::event::value_to_string;
use crate::flatten::Columns;
use crate::rules::{cloud_record_id, typed, DEFAULT_RULES, IP_RULES};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    let mut common = Columns::new();
    ctx.flatten_context(&mut common);
    ctx.apply(IP_RULES, &mut common);

    let event_name = ctx.field("event").map(value_to_string).unwrap_or_default();

    let mut event_columns = Columns::new();
    if !event_name.is_empty() {
        event_columns.insert(
            ctx.column("event_text"),
            Value::String(event_name.clone()),
            ColumnType::String,
        );
    }
    event_columns.insert(
        ctx.column("event"),
        Value::String(ctx.namer.table_value(&event_name)),
        ColumnType::String,
    );

    let mut rows = Vec::new();

    if !ctx.options.skip_tracks_table {
        let mut tracks = common.clone();
        ctx.apply(DEFAULT_RULES, &mut tracks);
        tracks.extend(&event_columns);
        ctx.store_full_event(&mut tracks);
        rows.push(ctx.row(ctx.namer.table("tracks"), tracks));
    }

    // Names without alphanumerics normalize to no table at all.
    let event_table = ctx.namer.event_table(&event_name);
    if !event_table.is_empty() {
        let mut columns = common;
        ctx.flatten_field(&mut columns, "properties");
        ctx.flatten_field(&mut columns, "userProperties");
        ctx.apply(DEFAULT_RULES, &mut columns);

        let record_id = cloud_record_id(ctx.payload, ctx.metadata, Value::Null)?;
        if !record_id.is_null() {
            let (value, ty) = typed(record_id);
            columns.insert(ctx.column("record_id"), value, ty);
        }
        columns.extend(&event_columns);

        rows.push(ctx.row(event_table, columns));
    }

    rows.extend(ctx.default_merge_row());
    Ok(rows)
}
