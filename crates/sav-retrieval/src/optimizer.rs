//! Retrieval parameter tuning.
//!
//! The optimizer searches over `(alpha, gamma)` for the parameter pair that
//! maximizes an [`Objective`]. Three strategies:
//!
//! - [`TuningStrategy::Grid`] — exhaustive lattice over `[0, 1]²`.
//! - [`TuningStrategy::Coordinate`] — coordinate descent with a shrinking
//!   step, one knob at a time.
//! - [`TuningStrategy::Explore`] — seeded random perturbation around the
//!   incumbent, accepting improvements.
//!
//! The standard objective is [`ReplayObjective`]: mean reciprocal rank over
//! recorded feedback, replayed against precomputed vector and FTS hits.
//! Vector and FTS hits do not depend on the tuned parameters, so each
//! evaluation only re-blends and re-personalizes — no database access.

use serde::{Deserialize, Serialize};

use sav_core::entities::Interest;

use crate::error::RetrievalError;
use crate::fts::FtsHit;
use crate::hybrid::combine_results;
use crate::params::RetrievalParams;
use crate::personalize::apply_personalization;
use crate::vector::VectorHit;

/// Scores a parameter candidate. Higher is better.
pub trait Objective {
    /// Evaluate `params`, returning a score in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Implementations may fail, e.g. when no feedback exists to score against.
    fn evaluate(&mut self, params: &RetrievalParams) -> Result<f64, RetrievalError>;
}

impl<F> Objective for F
where
    F: FnMut(&RetrievalParams) -> Result<f64, RetrievalError>,
{
    fn evaluate(&mut self, params: &RetrievalParams) -> Result<f64, RetrievalError> {
        self(params)
    }
}

/// Search strategy for the tuning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TuningStrategy {
    /// Exhaustive `steps × steps` lattice over `(alpha, gamma)`.
    Grid { steps: u32 },
    /// Coordinate descent: `rounds` passes over both knobs, step halving
    /// after each pass without improvement.
    Coordinate { rounds: u32 },
    /// Seeded random perturbation around the incumbent.
    Explore { iterations: u32, seed: u64 },
}

/// Outcome of a tuning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningReport {
    pub strategy: TuningStrategy,
    pub best_params: RetrievalParams,
    pub best_score: f64,
    pub evaluations: u32,
}

/// Tune `(alpha, gamma)` starting from `base`, maximizing `objective`.
///
/// `limit` and `min_score` are carried through from `base` unchanged.
///
/// # Errors
///
/// Propagates the first [`RetrievalError`] raised by the objective.
pub fn tune<O: Objective>(
    objective: &mut O,
    base: RetrievalParams,
    strategy: TuningStrategy,
) -> Result<TuningReport, RetrievalError> {
    let base = base.clamped();
    match strategy {
        TuningStrategy::Grid { steps } => tune_grid(objective, base, strategy, steps),
        TuningStrategy::Coordinate { rounds } => {
            tune_coordinate(objective, base, strategy, rounds)
        }
        TuningStrategy::Explore { iterations, seed } => {
            tune_explore(objective, base, strategy, iterations, seed)
        }
    }
}

fn tune_grid<O: Objective>(
    objective: &mut O,
    base: RetrievalParams,
    strategy: TuningStrategy,
    steps: u32,
) -> Result<TuningReport, RetrievalError> {
    let steps = steps.max(2);
    let mut best_params = base;
    let mut best_score = f64::NEG_INFINITY;
    let mut evaluations = 0;

    for i in 0..steps {
        for j in 0..steps {
            let candidate = RetrievalParams {
                alpha: f64::from(i) / f64::from(steps - 1),
                gamma: f64::from(j) / f64::from(steps - 1),
                ..base
            };
            let score = objective.evaluate(&candidate)?;
            evaluations += 1;
            if score > best_score {
                best_score = score;
                best_params = candidate;
            }
        }
    }

    Ok(TuningReport {
        strategy,
        best_params,
        best_score,
        evaluations,
    })
}

fn tune_coordinate<O: Objective>(
    objective: &mut O,
    base: RetrievalParams,
    strategy: TuningStrategy,
    rounds: u32,
) -> Result<TuningReport, RetrievalError> {
    let mut best_params = base;
    let mut best_score = objective.evaluate(&best_params)?;
    let mut evaluations = 1;
    let mut step = 0.25;

    for _ in 0..rounds {
        let mut improved = false;

        for knob in [Knob::Alpha, Knob::Gamma] {
            for direction in [step, -step] {
                let candidate = knob.nudged(best_params, direction);
                let score = objective.evaluate(&candidate)?;
                evaluations += 1;
                if score > best_score {
                    best_score = score;
                    best_params = candidate;
                    improved = true;
                }
            }
        }

        if !improved {
            step /= 2.0;
        }
    }

    Ok(TuningReport {
        strategy,
        best_params,
        best_score,
        evaluations,
    })
}

fn tune_explore<O: Objective>(
    objective: &mut O,
    base: RetrievalParams,
    strategy: TuningStrategy,
    iterations: u32,
    seed: u64,
) -> Result<TuningReport, RetrievalError> {
    let mut rng = XorShift64::new(seed);
    let mut best_params = base;
    let mut best_score = objective.evaluate(&best_params)?;
    let mut evaluations = 1;

    for _ in 0..iterations {
        let candidate = RetrievalParams {
            alpha: (best_params.alpha + rng.centered() * 0.3).clamp(0.0, 1.0),
            gamma: (best_params.gamma + rng.centered() * 0.3).clamp(0.0, 1.0),
            ..best_params
        };
        let score = objective.evaluate(&candidate)?;
        evaluations += 1;
        if score > best_score {
            best_score = score;
            best_params = candidate;
        }
    }

    Ok(TuningReport {
        strategy,
        best_params,
        best_score,
        evaluations,
    })
}

#[derive(Clone, Copy)]
enum Knob {
    Alpha,
    Gamma,
}

impl Knob {
    fn nudged(self, params: RetrievalParams, delta: f64) -> RetrievalParams {
        match self {
            Self::Alpha => RetrievalParams {
                alpha: (params.alpha + delta).clamp(0.0, 1.0),
                ..params
            },
            Self::Gamma => RetrievalParams {
                gamma: (params.gamma + delta).clamp(0.0, 1.0),
                ..params
            },
        }
    }
}

/// Deterministic xorshift64 generator — enough randomness for perturbation
/// search, fully reproducible under a fixed seed.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    const fn new(seed: u64) -> Self {
        // Zero state would stay zero forever
        Self {
            state: if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[-1, 1)`.
    #[allow(clippy::cast_precision_loss)]
    fn centered(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / ((1_u64 << 53) as f64) * 2.0 - 1.0
    }
}

/// Mean reciprocal rank of the first relevant ID in a ranked list.
///
/// Returns `1 / (1 + index)` of the first hit present in `relevant`,
/// or `0.0` if none appears.
#[must_use]
pub fn reciprocal_rank(ranked: &[String], relevant: &[String]) -> f64 {
    ranked
        .iter()
        .position(|id| relevant.contains(id))
        .map_or(0.0, |pos| {
            #[allow(clippy::cast_precision_loss)]
            let rank = (pos + 1) as f64;
            1.0 / rank
        })
}

/// One replayable query: its precomputed hits plus relevance judgments.
#[derive(Debug, Clone)]
pub struct ReplayCase {
    pub query: String,
    pub vector_hits: Vec<VectorHit>,
    pub fts_hits: Vec<FtsHit>,
    pub relevant_chunk_ids: Vec<String>,
}

/// Mean-reciprocal-rank objective over recorded feedback.
///
/// Each evaluation re-blends the precomputed per-query hits with the
/// candidate's `alpha`, re-personalizes with its `gamma`, and averages the
/// reciprocal rank of the first relevant chunk across queries.
pub struct ReplayObjective {
    cases: Vec<ReplayCase>,
    interests: Vec<Interest>,
}

impl ReplayObjective {
    /// Build the objective from replay cases and the profile's interests.
    #[must_use]
    pub const fn new(cases: Vec<ReplayCase>, interests: Vec<Interest>) -> Self {
        Self { cases, interests }
    }

    /// Number of replayable queries.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

impl Objective for ReplayObjective {
    fn evaluate(&mut self, params: &RetrievalParams) -> Result<f64, RetrievalError> {
        if self.cases.is_empty() {
            return Err(RetrievalError::NoFeedback);
        }

        let mut total = 0.0;
        for case in &self.cases {
            let mut hits = combine_results(
                &case.vector_hits,
                &case.fts_hits,
                params.alpha,
                params.limit,
            );
            apply_personalization(&mut hits, &self.interests, params.gamma);
            let ranked: Vec<String> = hits.into_iter().map(|h| h.chunk_id).collect();
            total += reciprocal_rank(&ranked, &case.relevant_chunk_ids);
        }

        #[allow(clippy::cast_precision_loss)]
        Ok(total / self.cases.len() as f64)
    }
}
