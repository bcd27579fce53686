use sav_core::enums::{AuditAction, EntityType};
use sav_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse_enum_arg;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: args
            .entity_type
            .as_deref()
            .map(|s| parse_enum_arg::<EntityType>(s, "entity type"))
            .transpose()?,
        entity_id: args.entity_id.clone(),
        action: args
            .action
            .as_deref()
            .map(|s| parse_enum_arg::<AuditAction>(s, "audit action"))
            .transpose()?,
        limit: Some(flags.limit_or(ctx.config.general.default_limit)),
    };

    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
