use sav_notify::EventJournal;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Print the most recent intelligence events from the JSONL journal.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let journal = EventJournal::new(ctx.journal_path());
    let mut events = journal.read_all()?;

    let limit = flags.limit_or(ctx.config.general.default_limit) as usize;
    if events.len() > limit {
        events.drain(..events.len() - limit);
    }

    if events.is_empty() && !ctx.config.general.journal {
        tracing::warn!(
            "event journal is disabled; set general.journal = true in .savant/config.toml"
        );
    }

    output(&events, flags.format)
}
