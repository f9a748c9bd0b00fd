use crate::config::Config;
use crate::error::{SfResult, SlateForgeError};
use crate::layout::SlotLayout;
use crate::optimizer::fitness::FitnessEval;
use crate::optimizer::postselect::{select_diverse, PostSelectOptions};
use crate::optimizer::runner::{
    CancelToken, GaOutcome, Optimizer, OptimizerOptions, ProgressCallback,
};
use crate::optimizer::validate::Validator;
use crate::pool::PlayerPool;
use crate::pospool::PositionPool;
use crate::postprocess::exposure;
use crate::profiler::{Profiler, ProfilingReport};
use crate::sets::{SetOptimizer, SetOptimizerOptions};
use crate::similarity::{diversity_metrics, DiversityMetrics, SimilarityMethod};
use crate::types::{Lineup, PlayerId};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeMode {
    /// Run the single-lineup loop, then pick a diverse subset from the
    /// final population.
    PostProcessing,
    /// Evolve sets of lineups directly.
    SetBased,
}

impl FromStr for OptimizeMode {
    type Err = SlateForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post_processing" => Ok(Self::PostProcessing),
            "set_based" => Ok(Self::SetBased),
            other => Err(SlateForgeError::Config(format!(
                "unknown mode '{other}' (expected post_processing or set_based)"
            ))),
        }
    }
}

/// The structured result every optimization path produces.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OptimizationReport {
    pub best_lineup: Lineup,
    pub best_score: f32,
    pub population: Vec<Lineup>,
    pub fitness: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineups: Option<Vec<Lineup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity_metrics: Option<DiversityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Vec<(PlayerId, usize)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiling: Option<ProfilingReport>,
    pub aborted: bool,
    pub stagnated: bool,
    pub best_solution_generation: usize,
}

/// Entry point: validates configuration, builds the derived pools, then
/// routes to the single-lineup loop, the post-processing selector, or the
/// set-based engine based on `target_lineups` and `mode`.
pub fn optimize(
    pool: &PlayerPool,
    config: &Config,
    max_time: Option<Duration>,
    cancel: &CancelToken,
    callback: &dyn ProgressCallback,
) -> SfResult<OptimizationReport> {
    config.validate()?;

    let posmap = config.site.parsed_posmap()?;
    let posfilter = config.site.parsed_posfilter()?;
    let flex_positions = config.site.parsed_flex_positions();

    let pospool = PositionPool::build(pool, &posmap, &posfilter, &flex_positions)?;
    let layout = SlotLayout::build(&posmap);
    let validator = Validator::new(pool, &layout, &flex_positions, config.site.salary_cap);
    let fitness = FitnessEval::new(pool.points(), config.site.parsed_slot_multipliers()?);

    let mut rng = match config.ga.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut profiler = Profiler::new(config.ga.enable_profiling);
    let method: SimilarityMethod = config.ga.diversity_method.parse()?;

    let target = config.ga.target_lineups;
    let mode: OptimizeMode = config.ga.mode.parse()?;

    if target == 1 {
        let mut options = OptimizerOptions::from_settings(&config.ga)?;
        options.max_time = max_time;
        let optimizer = Optimizer::new(&pospool, &layout, &validator, &fitness, options);
        let outcome = optimizer.run(&mut rng, &mut profiler, cancel, callback)?;
        return Ok(single_report(outcome, &profiler));
    }

    match mode {
        OptimizeMode::PostProcessing => {
            let mut options = OptimizerOptions::from_settings(&config.ga)?;
            options.max_time = max_time;
            let optimizer = Optimizer::new(&pospool, &layout, &validator, &fitness, options);
            let outcome = optimizer.run(&mut rng, &mut profiler, cancel, callback)?;

            let mut population = outcome.population.clone();
            let mut fit = outcome.fitness.clone();
            // elitism normally carries the best row into the final
            // population; make that unconditional before selecting from it
            let best_present = fit.iter().any(|&f| f >= outcome.best_fitness);
            if !best_present {
                population.push(&outcome.best_lineup);
                fit.push(outcome.best_fitness);
            }

            let selection = select_diverse(
                &population,
                &fit,
                &PostSelectOptions {
                    target_lineups: target,
                    diversity_weight: config.ga.diversity_weight,
                    min_overlap_threshold: config.ga.min_overlap_threshold,
                    method,
                },
            );

            let mut report = single_report(outcome, &profiler);
            report.exposure = Some(exposure(&selection.lineups));
            report.lineups = Some(selection.lineups);
            report.scores = Some(selection.scores);
            report.diversity_metrics = Some(selection.metrics);
            Ok(report)
        }
        OptimizeMode::SetBased => {
            let mut options = SetOptimizerOptions::from_settings(&config.ga)?;
            options.max_time = max_time;
            let optimizer = SetOptimizer::new(&pospool, &layout, &validator, &fitness, options);
            let outcome = optimizer.run(&mut rng, &mut profiler, cancel, callback)?;

            let metrics = diversity_metrics(&outcome.lineups, method);
            Ok(OptimizationReport {
                best_lineup: outcome.lineups[0].clone(),
                best_score: outcome.scores[0],
                population: outcome.lineups.clone(),
                fitness: outcome.scores.clone(),
                exposure: Some(exposure(&outcome.lineups)),
                lineups: Some(outcome.lineups),
                scores: Some(outcome.scores),
                diversity_metrics: Some(metrics),
                profiling: profiler.report(),
                aborted: outcome.aborted,
                stagnated: outcome.stagnated,
                best_solution_generation: outcome.best_generation,
            })
        }
    }
}

fn single_report(outcome: GaOutcome, profiler: &Profiler) -> OptimizationReport {
    OptimizationReport {
        best_lineup: outcome.best_lineup,
        best_score: outcome.best_fitness,
        population: outcome.population.to_lineups(),
        fitness: outcome.fitness,
        lineups: None,
        scores: None,
        diversity_metrics: None,
        exposure: None,
        profiling: profiler.report(),
        aborted: outcome.aborted,
        stagnated: outcome.stagnated,
        best_solution_generation: outcome.best_generation,
    }
}
