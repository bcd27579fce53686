use anyhow::Context;

use sav_notify::{EventKind, IntelligenceEvent};
use sav_retrieval::RetrievalParams;
use sav_retrieval::optimizer::{ReplayObjective, TuningStrategy, tune};
use sav_retrieval::pipeline::build_replay_case;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::OptimizeArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &OptimizeArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let interests = ctx.service.interests(&args.profile).await?;
    let pairs = ctx.service.replay_pairs(&args.profile).await?;
    anyhow::ensure!(
        !pairs.is_empty(),
        "profile {} has no positive feedback to tune against; record some with 'sav feedback'",
        args.profile
    );

    let retrieval = &ctx.config.retrieval;
    let base = RetrievalParams {
        alpha: retrieval.alpha,
        gamma: retrieval.gamma,
        limit: retrieval.limit,
        min_score: retrieval.min_score,
    };

    let mut cases = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let embedding = AppContext::embed_query(&pair.query).await?;
        let case = build_replay_case(
            &ctx.service,
            &pair.query,
            &embedding,
            pair.relevant_chunk_ids,
            base.limit,
        )
        .await?;
        cases.push(case);
    }

    let strategy = parse_strategy(args)?;
    let mut objective = ReplayObjective::new(cases, interests);
    let report = tune(&mut objective, base, strategy)?;

    ctx.service
        .record_tuning(
            &args.profile,
            serde_json::to_value(&report).context("failed to serialize tuning report")?,
        )
        .await?;
    ctx.hub.publish(IntelligenceEvent::now(
        EventKind::ParamsTuned,
        args.profile.clone(),
        serde_json::json!({
            "alpha": report.best_params.alpha,
            "gamma": report.best_params.gamma,
            "score": report.best_score,
        }),
    ))?;

    output(&report, flags.format)
}

fn parse_strategy(args: &OptimizeArgs) -> anyhow::Result<TuningStrategy> {
    match args.strategy.as_str() {
        "grid" => Ok(TuningStrategy::Grid { steps: args.steps }),
        "coordinate" => Ok(TuningStrategy::Coordinate {
            rounds: args.rounds,
        }),
        "explore" => {
            let seed = match args.seed {
                Some(seed) => seed,
                None => random_seed()?,
            };
            Ok(TuningStrategy::Explore {
                iterations: args.iterations,
                seed,
            })
        }
        other => anyhow::bail!("unknown strategy '{other}': expected grid, coordinate, or explore"),
    }
}

fn random_seed() -> anyhow::Result<u64> {
    let mut buf = [0u8; 8];
    getrandom::fill(&mut buf).map_err(|e| anyhow::anyhow!("failed to gather entropy: {e}"))?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strategy: &str, seed: Option<u64>) -> OptimizeArgs {
        OptimizeArgs {
            profile: "prf-test0001".to_string(),
            strategy: strategy.to_string(),
            steps: 5,
            rounds: 6,
            iterations: 40,
            seed,
        }
    }

    #[test]
    fn parses_all_strategies() {
        assert!(matches!(
            parse_strategy(&args("grid", None)).unwrap(),
            TuningStrategy::Grid { steps: 5 }
        ));
        assert!(matches!(
            parse_strategy(&args("coordinate", None)).unwrap(),
            TuningStrategy::Coordinate { rounds: 6 }
        ));
        assert!(matches!(
            parse_strategy(&args("explore", Some(9))).unwrap(),
            TuningStrategy::Explore {
                iterations: 40,
                seed: 9
            }
        ));
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(parse_strategy(&args("bayes", None)).is_err());
    }
}
