//! page and screen share one recipe and differ only in their table.

use super::{EventContext, HandlerResult};
use crate::event::lookup;
use crate::flatten::Columns;
use crate::rules::{typed, DEFAULT_RULES, IP_RULES};

pub(super) fn handle(ctx: &EventContext<'_>, table: &str) -> HandlerResult {
    let mut columns = Columns::new();
    ctx.flatten_field(&mut columns, "properties");
    ctx.flatten_context(&mut columns);
    ctx.apply(IP_RULES, &mut columns);
    ctx.apply(DEFAULT_RULES, &mut columns);

    let name = ctx
        .field("name")
        .or_else(|| lookup(ctx.payload, &["properties", "name"]));
    if let Some(name) = name {
        let (value, ty) = typed(name.clone());
        columns.insert(ctx.column("name"), value, ty);
    }
    ctx.store_full_event(&mut columns);

    let mut rows = vec![ctx.row(ctx.namer.table(table), columns)];
    rows.extend(ctx.default_merge_row());
    Ok(rows)
}
