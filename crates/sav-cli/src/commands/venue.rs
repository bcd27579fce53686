use sav_core::enums::VenueKind;
use sav_match::{VenueMatchWeights, match_venues};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::VenueCommands;
use crate::commands::shared::{parse_enum_arg, parse_topics};
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    action: &VenueCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        VenueCommands::Add {
            name,
            kind,
            topics,
            impact_factor,
            acceptance_rate,
            open_access,
        } => {
            let kind: VenueKind = parse_enum_arg(kind, "venue kind")?;
            let venue = ctx
                .service
                .create_venue(
                    name,
                    kind,
                    &parse_topics(topics.as_deref()),
                    *impact_factor,
                    *acceptance_rate,
                    *open_access,
                )
                .await?;
            output(&venue, flags.format)
        }
        VenueCommands::List => {
            let limit = flags.limit_or(ctx.config.general.default_limit);
            let venues = ctx.service.list_venues(limit).await?;
            output(&venues, flags.format)
        }
        VenueCommands::Match { profile } => {
            let interests = ctx.service.interests(profile).await?;
            anyhow::ensure!(
                !interests.is_empty(),
                "profile {profile} has no interests to match against; add some with 'sav profile interest'"
            );
            let venues = ctx.service.list_venues(u32::MAX).await?;
            let scores = match_venues(&interests, &venues, &VenueMatchWeights::default());

            let limit = flags.limit_or(ctx.config.general.default_limit) as usize;
            let top: Vec<_> = scores.into_iter().take(limit).collect();
            output(&top, flags.format)
        }
        VenueCommands::Delete { id } => {
            ctx.service.delete_venue(id).await?;
            if !flags.quiet {
                println!("deleted {id}");
            }
            Ok(())
        }
    }
}
