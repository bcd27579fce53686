use crate::cli::GlobalFlags;
use crate::cli::subcommands::WebhookCommands;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    action: &WebhookCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        WebhookCommands::Add { url, secret } => {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "webhook url must be http(s): '{url}'"
            );
            let endpoint = ctx.service.register_webhook(url, secret.as_deref()).await?;
            output(&endpoint, flags.format)
        }
        WebhookCommands::List { all } => {
            let endpoints = ctx.service.list_webhooks(!all).await?;
            output(&endpoints, flags.format)
        }
        WebhookCommands::Disable { id } => {
            ctx.service.deactivate_webhook(id).await?;
            if !flags.quiet {
                println!("disabled {id}");
            }
            Ok(())
        }
    }
}
