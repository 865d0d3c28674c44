//! identify: `identifies`, optional merge row, then `users`.

use serde_json::Value;

use super::{EventContext, HandlerResult};
use crate::column::ColumnType;
use crate::flatten::Columns;
use crate::rules::{typed, DEFAULT_RULES, IP_RULES, USER_TIMESTAMP_RULES};

pub(super) fn handle(ctx: &EventContext<'_>) -> HandlerResult {
    let mut common = Columns::new();
    ctx.flatten_field(&mut common, "userProperties");
    if ctx.options.allow_users_context_traits {
        ctx.flatten_context_traits(&mut common);
    }
    ctx.flatten_field(&mut common, "traits");
    ctx.flatten_context(&mut common);
    ctx.apply(IP_RULES, &mut common);
    if !ctx.dialect.datalake {
        ctx.apply(USER_TIMESTAMP_RULES, &mut common);
    }

    let mut identifies = common.clone();
    ctx.apply(DEFAULT_RULES, &mut identifies);
    ctx.store_full_event(&mut identifies);

    let mut rows = vec![ctx.row(ctx.namer.table("identifies"), identifies)];
    rows.extend(ctx.default_merge_row());

    if let Some(user_id) = ctx.field("userId") {
        if !ctx.options.skip_users_table {
            let mut users = common;
            let (id, ty) = typed(user_id.clone());
            users.insert(ctx.column("id"), id, ty);
            users.insert(
                ctx.column("received_at"),
                Value::String(ctx.mandatory.received_at.clone()),
                ColumnType::Datetime,
            );
            rows.push(ctx.row(ctx.namer.table("users"), users));
        }
    }

    Ok(rows)
}
