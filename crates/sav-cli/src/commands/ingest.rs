use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use sav_core::responses::IngestResponse;
use sav_notify::{EventKind, IntelligenceEvent};

use crate::chunker::chunk_text;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::IngestArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let title = args.title.clone().unwrap_or_else(|| {
        args.file
            .file_stem()
            .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().into_owned())
    });

    let chunks = chunk_text(&text);
    anyhow::ensure!(
        !chunks.is_empty(),
        "{} contains no text to ingest",
        args.file.display()
    );

    let progress = if flags.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(chunks.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message("embedding");
        bar
    };

    let embeddings = AppContext::embed_texts(chunks.clone()).await?;
    progress.inc(chunks.len() as u64);
    progress.finish_and_clear();

    let stored: Vec<(String, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();
    let document = ctx
        .service
        .ingest_document(
            args.profile.as_deref(),
            &title,
            args.file.to_str(),
            &stored,
        )
        .await?;

    ctx.hub.publish(IntelligenceEvent::now(
        EventKind::DocumentIngested,
        document.id.clone(),
        serde_json::json!({ "title": document.title, "chunks": document.chunk_count }),
    ))?;

    let chunks_embedded = document.chunk_count;
    output(
        &IngestResponse {
            document,
            chunks_embedded,
        },
        flags.format,
    )
}
