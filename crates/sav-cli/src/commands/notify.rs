use std::time::Duration;

use sav_core::enums::{NotificationPriority, NotificationStatus};
use sav_notify::{EventKind, IntelligenceEvent, LogDispatcher, RetryPolicy, WebhookDispatcher, drain};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::NotifyCommands;
use crate::commands::shared::parse_enum_arg;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    action: &NotifyCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        NotifyCommands::Send {
            title,
            body,
            priority,
            profile,
        } => {
            let priority: NotificationPriority = parse_enum_arg(priority, "priority")?;
            let notification = ctx
                .service
                .enqueue_notification(profile.as_deref(), title, body, priority)
                .await?;
            output(&notification, flags.format)
        }
        NotifyCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|s| parse_enum_arg::<NotificationStatus>(s, "notification status"))
                .transpose()?;
            let limit = flags.limit_or(ctx.config.general.default_limit);
            let notifications = ctx.service.list_notifications(status, limit).await?;
            output(&notifications, flags.format)
        }
        NotifyCommands::Drain => {
            let policy = RetryPolicy {
                max_attempts: ctx.config.notify.max_attempts,
                base_delay: Duration::from_millis(ctx.config.notify.base_delay_ms),
                max_delay: Duration::from_millis(ctx.config.notify.max_delay_ms),
            };

            let endpoints = ctx.service.list_webhooks(true).await?;
            let outcome = if endpoints.is_empty() {
                tracing::info!("no active webhooks; draining to log transport");
                drain(&ctx.service, &LogDispatcher, &policy).await?
            } else {
                let dispatcher = WebhookDispatcher::new(endpoints);
                drain(&ctx.service, &dispatcher, &policy).await?
            };

            if outcome.delivered > 0 {
                ctx.hub.publish(IntelligenceEvent::now(
                    EventKind::NotificationDelivered,
                    "queue",
                    serde_json::json!({
                        "delivered": outcome.delivered,
                        "dead_lettered": outcome.dead_lettered,
                    }),
                ))?;
            }

            output(&outcome, flags.format)
        }
    }
}
