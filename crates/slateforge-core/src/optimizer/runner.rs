use crate::config::GaSettings;
use crate::error::{SfResult, SlateForgeError};
use crate::layout::SlotLayout;
use crate::optimizer::crossover::{crossover, CrossoverMethod};
use crate::optimizer::fitness::FitnessEval;
use crate::optimizer::mutate::mutate;
use crate::optimizer::populate::populate;
use crate::optimizer::select::{select, SelectMethod};
use crate::optimizer::validate::{dedupe_rows, Validator};
use crate::pospool::PositionPool;
use crate::profiler::Profiler;
use crate::types::{Lineup, Population};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Attempts to assemble the initial population before declaring the
/// configuration infeasible.
const INITIAL_ATTEMPTS: usize = 10;
/// Attempts to refill a shrunken population each generation.
const TOPUP_ATTEMPTS: usize = 5;

/// Cooperative cancellation flag, checked at the top of each generation and
/// after the heavyweight operators. Cancelling returns the best lineup found
/// so far with `aborted` set; it is never an error.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Per-generation hook. Returning `false` aborts the run, which then
/// behaves exactly like a cancellation.
pub trait ProgressCallback {
    fn on_generation(&self, generation: usize, best_fitness: f32, n_unimproved: usize) -> bool;
}

/// Callback that never aborts and reports nothing.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_generation(&self, _generation: usize, _best_fitness: f32, _n_unimproved: usize) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    pub population_size: usize,
    pub n_generations: usize,
    pub stop_criteria: usize,
    pub elite_divisor: usize,
    pub elite_method: SelectMethod,
    pub select_method: SelectMethod,
    pub crossover_method: CrossoverMethod,
    pub mutation_rate: Option<f32>,
    pub tournament_size: usize,
    pub max_time: Option<Duration>,
    pub verbose: bool,
}

impl OptimizerOptions {
    pub fn from_settings(ga: &GaSettings) -> SfResult<Self> {
        Ok(Self {
            population_size: ga.population_size,
            n_generations: ga.n_generations,
            stop_criteria: ga.stop_criteria,
            elite_divisor: ga.elite_divisor,
            elite_method: ga.elite_method.parse()?,
            select_method: ga.select_method.parse()?,
            crossover_method: ga.crossover_method.parse()?,
            mutation_rate: ga.mutation_rate,
            tournament_size: ga.tournament_size,
            max_time: None,
            verbose: ga.verbose,
        })
    }
}

/// Everything the single-lineup loop produced, including the final
/// population so multilineup post-processing can pick from it.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    pub population: Population,
    pub fitness: Vec<f32>,
    pub best_lineup: Lineup,
    pub best_fitness: f32,
    pub best_generation: usize,
    pub generations_run: usize,
    pub aborted: bool,
    pub stagnated: bool,
}

/// The single-lineup generational loop (elitism + replacement +
/// stop-on-stagnation). Owns no state between runs; the population lives
/// and dies inside `run`.
pub struct Optimizer<'a> {
    pospool: &'a PositionPool,
    layout: &'a SlotLayout,
    validator: &'a Validator<'a>,
    fitness: &'a FitnessEval<'a>,
    options: OptimizerOptions,
}

impl<'a> Optimizer<'a> {
    pub fn new(
        pospool: &'a PositionPool,
        layout: &'a SlotLayout,
        validator: &'a Validator<'a>,
        fitness: &'a FitnessEval<'a>,
        options: OptimizerOptions,
    ) -> Self {
        Self {
            pospool,
            layout,
            validator,
            fitness,
            options,
        }
    }

    pub fn run(
        &self,
        rng: &mut fastrand::Rng,
        profiler: &mut Profiler,
        cancel: &CancelToken,
        callback: &dyn ProgressCallback,
    ) -> SfResult<GaOutcome> {
        let opts = &self.options;
        let k = opts.population_size;

        profiler.start_optimization();

        // initial population: populate + validate until full or out of attempts
        let mut pop = Population::new(self.layout.len());
        for _ in 0..INITIAL_ATTEMPTS {
            let fresh = profiler.time("populate", || populate(self.pospool, self.layout, k, rng));
            let fresh = profiler.time("validate", || self.validator.validate(fresh));
            pop.extend_from(&fresh);
            pop = dedupe_rows(pop);
            if pop.len() >= k {
                break;
            }
        }
        if pop.is_empty() {
            return Err(SlateForgeError::Infeasible(
                "no valid lineup satisfies the position map under the salary cap".into(),
            ));
        }

        let mut fit = profiler.time("fitness", || self.fitness.score_population(&pop));
        (pop, fit) = trim_to(pop, fit, k);

        let (best_idx, mut best_fitness) = argmax(&fit);
        let mut best_lineup: Lineup = pop.row(best_idx).to_vec();
        let mut best_generation = 0usize;

        profiler.mark_setup_complete();
        profiler.mark_best_solution(0);

        let mut n_unimproved = 0usize;
        let mut generations_run = 0usize;
        let mut aborted = false;
        let mut stagnated = false;
        let started = Instant::now();

        for generation in 1..=opts.n_generations {
            if cancel.is_cancelled() {
                aborted = true;
                break;
            }
            if let Some(limit) = opts.max_time {
                if started.elapsed() >= limit {
                    aborted = true;
                    break;
                }
            }
            if n_unimproved >= opts.stop_criteria {
                stagnated = true;
                break;
            }
            generations_run = generation;

            if opts.verbose {
                info!("generation {generation}: best {best_fitness:.2}");
            }

            // hold back the fittest slice so crossover and mutation cannot
            // overwrite good individuals
            let elite_n = (pop.len() / opts.elite_divisor).max(1);
            let elite_idx = profiler.time("select", || {
                select(&fit, elite_n, opts.elite_method, opts.tournament_size, rng)
            });
            let elite = pop.select_rows(&elite_idx);

            let parent_idx = profiler.time("select", || {
                select(&fit, pop.len(), opts.select_method, opts.tournament_size, rng)
            });
            let parents = pop.select_rows(&parent_idx);

            let mut children =
                profiler.time("crossover", || crossover(&parents, opts.crossover_method, rng));

            // variable rate ramps up while the search is stuck
            let rate = opts
                .mutation_rate
                .unwrap_or_else(|| (n_unimproved as f32 / 50.0).max(0.05));
            profiler.time("mutate", || {
                mutate(&mut children, self.layout, self.pospool, rate, rng)
            });

            let mut next = elite;
            next.extend_from(&children);
            let mut next = profiler.time("validate", || self.validator.validate(next));

            if cancel.is_cancelled() {
                aborted = true;
                break;
            }

            // validators only filter, so the population shrinks; refill it
            // through the same populate + validate path
            let mut attempts = 0;
            while next.len() < k && attempts < TOPUP_ATTEMPTS {
                let deficit = k - next.len();
                let fresh =
                    profiler.time("populate", || populate(self.pospool, self.layout, deficit, rng));
                let fresh = profiler.time("validate", || self.validator.validate(fresh));
                next.extend_from(&fresh);
                next = dedupe_rows(next);
                attempts += 1;
            }
            if next.is_empty() {
                return Err(SlateForgeError::Infeasible(
                    "population collapsed to zero valid lineups after top-up retries".into(),
                ));
            }

            let next_fit = profiler.time("fitness", || self.fitness.score_population(&next));
            (pop, fit) = trim_to(next, next_fit, k);

            let (gen_idx, gen_best) = argmax(&fit);
            if gen_best > best_fitness {
                best_fitness = gen_best;
                best_lineup = pop.row(gen_idx).to_vec();
                best_generation = generation;
                n_unimproved = 0;
                profiler.mark_best_solution(generation);
                debug!("lineup improved to {best_fitness:.2} at generation {generation}");
            } else {
                n_unimproved += 1;
            }

            if !callback.on_generation(generation, best_fitness, n_unimproved) {
                aborted = true;
                break;
            }
        }

        profiler.end_optimization();

        Ok(GaOutcome {
            population: pop,
            fitness: fit,
            best_lineup,
            best_fitness,
            best_generation,
            generations_run,
            aborted,
            stagnated,
        })
    }
}

fn argmax(fit: &[f32]) -> (usize, f32) {
    let mut best_idx = 0;
    let mut best = fit[0];
    for (i, &f) in fit.iter().enumerate().skip(1) {
        if f > best {
            best = f;
            best_idx = i;
        }
    }
    (best_idx, best)
}

/// Keeps the `k` highest-fitness rows, preserving their relative order.
fn trim_to(pop: Population, fit: Vec<f32>, k: usize) -> (Population, Vec<f32>) {
    if pop.len() <= k {
        return (pop, fit);
    }
    let mut order: Vec<usize> = (0..fit.len()).collect();
    order.sort_by(|&a, &b| {
        fit[b]
            .partial_cmp(&fit[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(k);
    order.sort_unstable();
    let trimmed_fit = order.iter().map(|&i| fit[i]).collect();
    (pop.select_rows(&order), trimmed_fit)
}
