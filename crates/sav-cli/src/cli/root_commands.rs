use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    FundingCommands, NotifyCommands, ProfileCommands, VenueCommands, WebhookCommands,
};

/// All top-level `sav` commands.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize a savant project in the current directory.
    Init(InitArgs),
    /// Research profile and interest management.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Ingest a document: chunk, embed, store.
    Ingest(IngestArgs),
    /// Hybrid (vector + keyword) search, optionally personalized.
    Search(SearchArgs),
    /// Record feedback on a search hit and nudge interest weights.
    Feedback(FeedbackArgs),
    /// Publication venue management and matching.
    Venue {
        #[command(subcommand)]
        action: VenueCommands,
    },
    /// Funding opportunity management and matching.
    Funding {
        #[command(subcommand)]
        action: FundingCommands,
    },
    /// Notification queue operations.
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
    /// Webhook endpoint management.
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },
    /// Tune retrieval parameters from recorded feedback.
    Optimize(OptimizeArgs),
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Read recent intelligence events from the JSONL journal.
    Events,
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct IngestArgs {
    /// Path to a UTF-8 text or markdown file.
    pub file: PathBuf,
    /// Document title (defaults to the file stem).
    #[arg(long)]
    pub title: Option<String>,
    /// Owning profile ID.
    #[arg(long)]
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,
    /// Profile whose interests personalize the ranking.
    #[arg(long)]
    pub profile: Option<String>,
    /// Vector/keyword blend override (0 = keyword only, 1 = vector only).
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Personalization strength override (0 disables boosting).
    #[arg(long)]
    pub gamma: Option<f64>,
    /// Minimum combined score override.
    #[arg(long)]
    pub min_score: Option<f64>,
}

#[derive(Clone, Debug, Args)]
pub struct FeedbackArgs {
    /// Profile recording the feedback.
    #[arg(long)]
    pub profile: String,
    /// The query the hit was returned for.
    #[arg(long)]
    pub query: String,
    /// The chunk the researcher interacted with.
    #[arg(long)]
    pub chunk: String,
    /// What happened: clicked, saved, cited, dismissed.
    #[arg(long)]
    pub action: String,
}

#[derive(Clone, Debug, Args)]
pub struct OptimizeArgs {
    /// Profile whose feedback is replayed.
    #[arg(long)]
    pub profile: String,
    /// Strategy: grid, coordinate, explore.
    #[arg(long, default_value = "grid")]
    pub strategy: String,
    /// Lattice resolution for grid search.
    #[arg(long, default_value_t = 5)]
    pub steps: u32,
    /// Passes for coordinate descent.
    #[arg(long, default_value_t = 6)]
    pub rounds: u32,
    /// Iterations for explore search.
    #[arg(long, default_value_t = 40)]
    pub iterations: u32,
    /// Seed for explore search (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Filter by entity type (profile, document, venue, ...).
    #[arg(long)]
    pub entity_type: Option<String>,
    /// Filter by entity ID.
    #[arg(long)]
    pub entity_id: Option<String>,
    /// Filter by action (created, updated, status_changed, ...).
    #[arg(long)]
    pub action: Option<String>,
}
