use clap::Subcommand;

/// Research profile commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProfileCommands {
    /// Create a research profile.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        affiliation: Option<String>,
    },
    /// Get a profile (including its interests).
    Get { id: String },
    /// List profiles.
    List,
    /// Update a profile.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        affiliation: Option<String>,
    },
    /// Delete a profile.
    Delete { id: String },
    /// Set an interest keyword weight.
    Interest {
        id: String,
        #[arg(long)]
        keyword: String,
        #[arg(long)]
        weight: f64,
    },
}

/// Publication venue commands.
#[derive(Clone, Debug, Subcommand)]
pub enum VenueCommands {
    /// Add a venue.
    Add {
        #[arg(long)]
        name: String,
        /// journal, conference, or workshop
        #[arg(long, default_value = "journal")]
        kind: String,
        /// Comma-separated topic keywords.
        #[arg(long)]
        topics: Option<String>,
        #[arg(long)]
        impact_factor: Option<f64>,
        #[arg(long)]
        acceptance_rate: Option<f64>,
        #[arg(long)]
        open_access: bool,
    },
    /// List venues.
    List,
    /// Rank venues against a profile's interests.
    Match {
        #[arg(long)]
        profile: String,
    },
    /// Delete a venue.
    Delete { id: String },
}

/// Funding opportunity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FundingCommands {
    /// Add a funding opportunity.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        agency: String,
        /// Comma-separated topic keywords.
        #[arg(long)]
        topics: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        /// RFC 3339 deadline, e.g. 2026-10-01T00:00:00Z.
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// List funding opportunities.
    List {
        /// open, closing, or closed
        #[arg(long)]
        status: Option<String>,
    },
    /// Rank funding opportunities against a profile's interests.
    Match {
        #[arg(long)]
        profile: String,
    },
    /// Transition a funding opportunity's status.
    Transition {
        id: String,
        /// closing or closed
        #[arg(long)]
        status: String,
    },
    /// Warn about opportunities closing within a window, enqueuing
    /// notifications for each.
    Closing {
        #[arg(long, default_value_t = 30)]
        days: i64,
        /// Profile to notify.
        #[arg(long)]
        profile: Option<String>,
    },
}

/// Notification queue commands.
#[derive(Clone, Debug, Subcommand)]
pub enum NotifyCommands {
    /// Enqueue a notification.
    Send {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// low, normal, high, urgent
        #[arg(long, default_value = "normal")]
        priority: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// List notifications.
    List {
        /// pending, sending, delivered, failed, dead
        #[arg(long)]
        status: Option<String>,
    },
    /// Drain the queue through the registered webhooks (or the log
    /// transport when none are active).
    Drain,
}

/// Webhook endpoint commands.
#[derive(Clone, Debug, Subcommand)]
pub enum WebhookCommands {
    /// Register an endpoint.
    Add {
        url: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// List endpoints.
    List {
        #[arg(long)]
        all: bool,
    },
    /// Deactivate an endpoint.
    Disable { id: String },
}
