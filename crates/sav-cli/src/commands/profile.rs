use serde::Serialize;

use sav_core::entities::{Interest, ResearchProfile};
use sav_core::errors::CoreError;
use sav_db::updates::ProfileUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileCommands;
use crate::context::AppContext;
use crate::output::output;

/// Profile plus its interests, as printed by `sav profile get`.
#[derive(Debug, Serialize)]
struct ProfileView {
    #[serde(flatten)]
    profile: ResearchProfile,
    interests: Vec<Interest>,
}

pub async fn handle(
    action: &ProfileCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Create { name, affiliation } => {
            let profile = ctx
                .service
                .create_profile(name, affiliation.as_deref())
                .await?;
            output(&profile, flags.format)
        }
        ProfileCommands::Get { id } => {
            let profile = ctx.service.get_profile(id).await?;
            let interests = ctx.service.interests(id).await?;
            output(&ProfileView { profile, interests }, flags.format)
        }
        ProfileCommands::List => {
            let limit = flags.limit_or(ctx.config.general.default_limit);
            let profiles = ctx.service.list_profiles(limit).await?;
            output(&profiles, flags.format)
        }
        ProfileCommands::Update {
            id,
            name,
            affiliation,
        } => {
            if name.is_none() && affiliation.is_none() {
                return Err(CoreError::Validation(
                    "nothing to update: pass --name or --affiliation".to_string(),
                )
                .into());
            }
            let mut builder = ProfileUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.clone());
            }
            if let Some(affiliation) = affiliation {
                // "--affiliation none" clears the field
                let value = (affiliation != "none").then(|| affiliation.clone());
                builder = builder.affiliation(value);
            }
            let updated = ctx.service.update_profile(id, builder.build()).await?;
            output(&updated, flags.format)
        }
        ProfileCommands::Delete { id } => {
            ctx.service.delete_profile(id).await?;
            if !flags.quiet {
                println!("deleted {id}");
            }
            Ok(())
        }
        ProfileCommands::Interest {
            id,
            keyword,
            weight,
        } => {
            let interest = ctx.service.set_interest(id, keyword, *weight).await?;
            output(&interest, flags.format)
        }
    }
}
