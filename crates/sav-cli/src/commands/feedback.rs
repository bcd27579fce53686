use serde::Serialize;

use sav_core::entities::FeedbackEvent;
use sav_core::enums::FeedbackAction;
use sav_retrieval::personalize::apply_feedback;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FeedbackArgs;
use crate::commands::shared::parse_enum_arg;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct FeedbackResponse {
    event: FeedbackEvent,
    nudged_interests: Vec<String>,
}

pub async fn handle(
    args: &FeedbackArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let action: FeedbackAction = parse_enum_arg(&args.action, "feedback action")?;

    // Validate the chunk exists and grab its content for interest nudging
    let record = ctx.service.get_chunk(&args.chunk).await?;

    let event = ctx
        .service
        .record_feedback(&args.profile, &args.query, &args.chunk, action)
        .await?;

    let nudged_interests =
        apply_feedback(&ctx.service, &args.profile, &record.chunk.content, action).await?;

    output(
        &FeedbackResponse {
            event,
            nudged_interests,
        },
        flags.format,
    )
}
