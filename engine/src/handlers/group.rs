use super::{EventContext, HandlerResult};
use crate::flatten::Columns;
use crate::rules::{typed, DEFAULT_RULES, IP_RULES};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    let mut columns = Columns::new();
    ctx.flatten_field(&mut columns, "traits");
    ctx.flatten_context(&mut columns);
    ctx.apply(IP_RULES, &mut columns);
    ctx.apply(DEFAULT_RULES, &mut columns);

    if let Some(group_id) = ctx.field("groupId") {
        let (value, ty) = typed(group_id.clone());
        columns.insert(ctx.column("group_id"), value, ty);
    }
    ctx.store_full_event(&mut columns);

    let mut rows = vec![ctx.row(ctx.namer.table("groups"), columns)];
    rows.extend(ctx.default_merge_row());
    Ok(rows)
}
