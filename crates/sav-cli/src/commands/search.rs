use sav_core::responses::{SearchHit, SearchResponse};
use sav_retrieval::{RetrievalParams, pipeline::retrieve};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SearchArgs;
use crate::context::AppContext;
use crate::output::output;

/// Characters of chunk content shown per hit.
const SNIPPET_CHARS: usize = 240;

pub async fn handle(args: &SearchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let retrieval = &ctx.config.retrieval;
    let params = RetrievalParams {
        alpha: args.alpha.unwrap_or(retrieval.alpha),
        gamma: args.gamma.unwrap_or(retrieval.gamma),
        limit: flags.limit_or(retrieval.limit),
        min_score: args.min_score.unwrap_or(retrieval.min_score),
    };

    let interests = match &args.profile {
        Some(profile_id) => ctx.service.interests(profile_id).await?,
        None => Vec::new(),
    };

    let query_embedding = AppContext::embed_query(&args.query).await?;
    let hits = retrieve(
        &ctx.service,
        &args.query,
        &query_embedding,
        &interests,
        &params,
    )
    .await?;

    let hits: Vec<SearchHit> = hits
        .into_iter()
        .map(|h| SearchHit {
            chunk_id: h.chunk_id,
            document_id: h.document_id,
            document_title: h.document_title,
            snippet: snippet(&h.content),
            vector_score: h.vector_score,
            fts_score: h.fts_score,
            score: h.combined_score,
        })
        .collect();

    let total_hits = u32::try_from(hits.len()).unwrap_or(u32::MAX);
    output(
        &SearchResponse {
            query: args.query.clone(),
            profile_id: args.profile.clone(),
            hits,
            total_hits,
        },
        flags.format,
    )
}

fn snippet(content: &str) -> String {
    if content.len() <= SNIPPET_CHARS {
        return content.to_string();
    }
    let mut cut = SNIPPET_CHARS;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &content[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_untouched() {
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn long_content_truncated_with_ellipsis() {
        let long = "a".repeat(500);
        let s = snippet(&long);
        assert!(s.ends_with('…'));
        assert!(s.chars().count() <= SNIPPET_CHARS + 1);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(400);
        let s = snippet(&long);
        assert!(s.ends_with('…'));
    }
}
