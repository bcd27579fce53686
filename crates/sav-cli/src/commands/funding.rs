use anyhow::Context;
use chrono::{DateTime, Utc};

use sav_core::enums::{FundingStatus, NotificationPriority};
use sav_match::{FundingMatchWeights, match_funding};
use sav_notify::{EventKind, IntelligenceEvent};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FundingCommands;
use crate::commands::shared::{parse_enum_arg, parse_topics};
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    action: &FundingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FundingCommands::Add {
            title,
            agency,
            topics,
            amount,
            deadline,
            url,
        } => {
            let deadline = deadline
                .as_deref()
                .map(|d| {
                    DateTime::parse_from_rfc3339(d)
                        .map(|dt| dt.with_timezone(&Utc))
                        .with_context(|| format!("invalid RFC 3339 deadline: '{d}'"))
                })
                .transpose()?;

            let funding = ctx
                .service
                .create_funding(
                    title,
                    agency,
                    &parse_topics(topics.as_deref()),
                    *amount,
                    deadline,
                    url.as_deref(),
                )
                .await?;
            output(&funding, flags.format)
        }
        FundingCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|s| parse_enum_arg::<FundingStatus>(s, "funding status"))
                .transpose()?;
            let limit = flags.limit_or(ctx.config.general.default_limit);
            let items = ctx.service.list_funding(status, limit).await?;
            output(&items, flags.format)
        }
        FundingCommands::Match { profile } => {
            let interests = ctx.service.interests(profile).await?;
            anyhow::ensure!(
                !interests.is_empty(),
                "profile {profile} has no interests to match against; add some with 'sav profile interest'"
            );
            let opportunities = ctx.service.list_funding(None, u32::MAX).await?;
            let scores = match_funding(
                &interests,
                &opportunities,
                &FundingMatchWeights::default(),
                Utc::now(),
            );

            let limit = flags.limit_or(ctx.config.general.default_limit) as usize;
            let top: Vec<_> = scores.into_iter().take(limit).collect();
            output(&top, flags.format)
        }
        FundingCommands::Transition { id, status } => {
            let status: FundingStatus = parse_enum_arg(status, "funding status")?;
            let updated = ctx.service.transition_funding(id, status).await?;
            output(&updated, flags.format)
        }
        FundingCommands::Closing { days, profile } => {
            let closing = ctx.service.funding_closing_within(*days).await?;

            for opportunity in &closing {
                let deadline = opportunity
                    .deadline
                    .map_or_else(|| "unknown".to_string(), |d| d.to_rfc3339());
                ctx.service
                    .enqueue_notification(
                        profile.as_deref(),
                        &format!("Deadline approaching: {}", opportunity.title),
                        &format!(
                            "{} ({}) closes at {deadline}",
                            opportunity.title, opportunity.agency
                        ),
                        NotificationPriority::High,
                    )
                    .await?;
                ctx.hub.publish(IntelligenceEvent::now(
                    EventKind::FundingClosing,
                    opportunity.id.clone(),
                    serde_json::json!({ "title": opportunity.title, "deadline": deadline }),
                ))?;
            }

            output(&closing, flags.format)
        }
    }
}
