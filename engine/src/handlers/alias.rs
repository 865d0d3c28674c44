//! alias links a previous id to the current user id.

use super::{EventContext, HandlerResult};
use crate::flatten::Columns;
use crate::rules::{typed, DEFAULT_RULES, IP_RULES};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    let mut columns = Columns::new();
    ctx.flatten_field(&mut columns, "traits");
    ctx.flatten_context(&mut columns);
    ctx.apply(IP_RULES, &mut columns);
    ctx.apply(DEFAULT_RULES, &mut columns);

    let previous_id = ctx.field("previousId");
    if let Some(previous_id) = previous_id {
        let (value, ty) = typed(previous_id.clone());
        columns.insert(ctx.column("previous_id"), value, ty);
    }
    ctx.store_full_event(&mut columns);

    let mut rows = vec![ctx.row(ctx.namer.table("aliases"), columns)];
    rows.extend(ctx.identity_merge_row(
        ("user_id", ctx.field("userId")),
        ("user_id", previous_id),
    ));
    Ok(rows)
}
