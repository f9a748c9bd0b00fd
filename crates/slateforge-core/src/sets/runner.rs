use crate::config::GaSettings;
use crate::error::{SfResult, SlateForgeError};
use crate::layout::SlotLayout;
use crate::optimizer::fitness::FitnessEval;
use crate::optimizer::runner::{CancelToken, ProgressCallback};
use crate::optimizer::validate::Validator;
use crate::pospool::{PositionPool, WeightedSampler};
use crate::profiler::Profiler;
use crate::sets::crossover::crossover_sets;
use crate::sets::fitness::{set_fitness, SetFitnessOptions};
use crate::sets::mutate::{mutate_sets, MutationIntensity};
use crate::sets::sampler::{build_lineup_pool, default_cluster_count, sample_initial_sets};
use crate::similarity::SimilarityMethod;
use crate::types::{Lineup, PlayerId, Population, SetPopulation};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TOPUP_ATTEMPTS: usize = 5;
/// Share of the lineup pool treated as its elite portion during pool
/// evolution.
const POOL_ELITE_SHARE: usize = 10;

#[derive(Debug, Clone)]
pub struct SetOptimizerOptions {
    pub population_size: usize,
    pub target_lineups: usize,
    pub n_generations: usize,
    pub stop_criteria: usize,
    pub elite_divisor: usize,
    pub tournament_size: usize,
    pub mutation_rate: Option<f32>,
    pub intensity: MutationIntensity,
    pub diversity_weight: f32,
    pub penalty_scale: f32,
    pub method: SimilarityMethod,
    pub lineup_pool_size: usize,
    pub n_clusters: Option<usize>,
    pub enable_pool_evolution: bool,
    pub pool_refresh_interval: usize,
    pub pool_evolution_rate: f32,
    pub max_time: Option<Duration>,
    pub verbose: bool,
}

impl SetOptimizerOptions {
    pub fn from_settings(ga: &GaSettings) -> SfResult<Self> {
        Ok(Self {
            population_size: ga.population_size,
            target_lineups: ga.target_lineups,
            n_generations: ga.n_generations,
            stop_criteria: ga.stop_criteria,
            elite_divisor: ga.elite_divisor,
            tournament_size: ga.tournament_size,
            mutation_rate: ga.mutation_rate,
            intensity: ga.mutation_intensity.parse()?,
            diversity_weight: ga.diversity_weight,
            penalty_scale: ga.diversity_penalty_scale,
            method: ga.diversity_method.parse()?,
            lineup_pool_size: ga.lineup_pool_size,
            n_clusters: ga.n_clusters,
            enable_pool_evolution: ga.enable_pool_evolution,
            pool_refresh_interval: ga.pool_refresh_interval.max(1),
            pool_evolution_rate: ga.pool_evolution_rate,
            max_time: None,
            verbose: ga.verbose,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SetOutcome {
    /// Lineups of the best set, sorted by projected points descending.
    pub lineups: Vec<Lineup>,
    pub scores: Vec<f32>,
    pub best_set_fitness: f32,
    pub best_generation: usize,
    pub generations_run: usize,
    pub aborted: bool,
    pub stagnated: bool,
}

/// The set-based engine: the unit of selection is a whole set of N
/// lineups, so aggregate quality and intra-set diversity evolve together
/// instead of being reconciled after the fact.
pub struct SetOptimizer<'a> {
    pospool: &'a PositionPool,
    layout: &'a SlotLayout,
    validator: &'a Validator<'a>,
    fitness: &'a FitnessEval<'a>,
    options: SetOptimizerOptions,
}

impl<'a> SetOptimizer<'a> {
    pub fn new(
        pospool: &'a PositionPool,
        layout: &'a SlotLayout,
        validator: &'a Validator<'a>,
        fitness: &'a FitnessEval<'a>,
        options: SetOptimizerOptions,
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
    ) -> SfResult<SetOutcome> {
        let opts = &self.options;
        let k = opts.population_size;
        let n = opts.target_lineups;
        let lineup_len = self.layout.len();

        profiler.start_optimization();

        let mut pool = profiler.time("pool_build", || {
            build_lineup_pool(
                self.pospool,
                self.layout,
                self.validator,
                opts.lineup_pool_size,
                rng,
            )
        })?;
        if pool.len() < n {
            return Err(SlateForgeError::Infeasible(format!(
                "only {} valid lineups exist, need {} per set",
                pool.len(),
                n
            )));
        }
        let mut pool_fit = self.fitness.score_population(&pool);
        let mut pool_sampler = make_pool_sampler(&pool_fit);

        let n_clusters = opts
            .n_clusters
            .unwrap_or_else(|| default_cluster_count(pool.len(), n));

        let mut sets = profiler.time("populate", || {
            sample_initial_sets(&pool, k, n, n_clusters, opts.method, rng)
        });
        let fit_opts = SetFitnessOptions {
            diversity_weight: opts.diversity_weight,
            penalty_scale: opts.penalty_scale,
            method: opts.method,
        };
        let mut fit = profiler.time("fitness", || set_fitness(&sets, self.fitness, &fit_opts));

        let (best_idx, mut best_fitness) = argmax(&fit);
        let mut best_set: Vec<PlayerId> = sets.set(best_idx).to_vec();
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
                info!("generation {generation}: best set fitness {best_fitness:.2}");
            }

            let elite_n = (sets.len() / opts.elite_divisor).max(1);
            let elite_idx = top_indices(&fit, elite_n);
            let elite = sets.select_sets(&elite_idx);

            let mut children = profiler.time("crossover", || {
                crossover_sets(&sets, self.fitness, opts.tournament_size, &pool, rng)
            });

            let rate = opts.mutation_rate.unwrap_or(0.1);
            profiler.time("mutate", || {
                mutate_sets(
                    &mut children,
                    rate,
                    opts.intensity,
                    n_unimproved,
                    self.layout,
                    self.pospool,
                    &pool,
                    pool_sampler.as_ref(),
                    rng,
                )
            });

            let mut next = elite;
            for idx in 0..children.len() {
                if next.len() >= k {
                    break;
                }
                next.push_set(children.set(idx));
            }

            let mut next = profiler.time("validate", || {
                filter_valid_sets(&next, self.validator, n, lineup_len)
            });

            if cancel.is_cancelled() {
                aborted = true;
                break;
            }

            let mut attempts = 0;
            while next.len() < k && attempts < TOPUP_ATTEMPTS {
                let fresh = profiler.time("populate", || {
                    sample_initial_sets(&pool, k - next.len(), n, n_clusters, opts.method, rng)
                });
                let fresh = filter_valid_sets(&fresh, self.validator, n, lineup_len);
                for idx in 0..fresh.len() {
                    if next.len() >= k {
                        break;
                    }
                    next.push_set(fresh.set(idx));
                }
                attempts += 1;
            }
            if next.is_empty() {
                return Err(SlateForgeError::Infeasible(
                    "set population collapsed after top-up retries".into(),
                ));
            }

            let next_fit = profiler.time("fitness", || set_fitness(&next, self.fitness, &fit_opts));
            (sets, fit) = trim_sets(next, next_fit, k);

            let (gen_idx, gen_best) = argmax(&fit);
            if gen_best > best_fitness {
                best_fitness = gen_best;
                best_set = sets.set(gen_idx).to_vec();
                best_generation = generation;
                n_unimproved = 0;
                profiler.mark_best_solution(generation);
                debug!("set fitness improved to {best_fitness:.2} at generation {generation}");
            } else {
                n_unimproved += 1;
            }

            if opts.enable_pool_evolution && generation % opts.pool_refresh_interval == 0 {
                profiler.time("pool_evolve", || {
                    evolve_pool(
                        &mut pool,
                        &mut pool_fit,
                        &sets,
                        self.fitness,
                        opts.pool_evolution_rate,
                    )
                });
                pool_sampler = make_pool_sampler(&pool_fit);
            }

            if !callback.on_generation(generation, best_fitness, n_unimproved) {
                aborted = true;
                break;
            }
        }

        profiler.end_optimization();

        // best set, presented highest-scoring lineup first
        let mut scored: Vec<(f32, Lineup)> = best_set
            .chunks_exact(lineup_len)
            .map(|lineup| (self.fitness.score_row(lineup), lineup.to_vec()))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(SetOutcome {
            scores: scored.iter().map(|(s, _)| *s).collect(),
            lineups: scored.into_iter().map(|(_, l)| l).collect(),
            best_set_fitness: best_fitness,
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

fn top_indices(fit: &[f32], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fit.len()).collect();
    order.sort_by(|&a, &b| {
        fit[b]
            .partial_cmp(&fit[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(n.min(fit.len()));
    order
}

fn trim_sets(sets: SetPopulation, fit: Vec<f32>, k: usize) -> (SetPopulation, Vec<f32>) {
    if sets.len() <= k {
        return (sets, fit);
    }
    let mut keep = top_indices(&fit, k);
    keep.sort_unstable();
    let trimmed_fit = keep.iter().map(|&i| fit[i]).collect();
    (sets.select_sets(&keep), trimmed_fit)
}

fn sorted_key(row: &[PlayerId]) -> Vec<PlayerId> {
    let mut key = row.to_vec();
    key.sort_unstable();
    key
}

fn set_is_valid(validator: &Validator, set: &[PlayerId], n: usize, lineup_len: usize) -> bool {
    let mut keys: Vec<Vec<PlayerId>> = Vec::with_capacity(n);
    for i in 0..n {
        let lineup = &set[i * lineup_len..(i + 1) * lineup_len];
        if !validator.is_valid_row(lineup) {
            return false;
        }
        let key = sorted_key(lineup);
        if keys.contains(&key) {
            return false;
        }
        keys.push(key);
    }
    true
}

fn filter_valid_sets(
    sets: &SetPopulation,
    validator: &Validator,
    n: usize,
    lineup_len: usize,
) -> SetPopulation {
    let keep: Vec<usize> = (0..sets.len())
        .filter(|&idx| set_is_valid(validator, sets.set(idx), n, lineup_len))
        .collect();
    sets.select_sets(&keep)
}

fn make_pool_sampler(pool_fit: &[f32]) -> Option<WeightedSampler> {
    let min = pool_fit.iter().copied().fold(f32::MAX, f32::min);
    let shifted: Vec<f32> = pool_fit.iter().map(|f| f - min + 1e-6).collect();
    WeightedSampler::new(&shifted)
}

/// Pool evolution: the worst slice of the pool's elite portion is replaced
/// by the best lineups currently living in the evolved sets, provided they
/// actually score higher and are not already pooled.
fn evolve_pool(
    pool: &mut Population,
    pool_fit: &mut [f32],
    sets: &SetPopulation,
    eval: &FitnessEval,
    rate: f32,
) {
    let elite_len = (pool.len() / POOL_ELITE_SHARE).max(1);
    let order = top_indices(pool_fit, pool.len());
    let elite = &order[..elite_len];
    let n_replace = ((elite_len as f32 * rate) as usize).max(1).min(elite_len);
    // worst members of the elite portion
    let targets: Vec<usize> = elite[elite_len - n_replace..].to_vec();

    let pool_keys: HashSet<Vec<PlayerId>> = pool.rows().map(sorted_key).collect();

    let lineup_len = pool.lineup_len();
    let mut candidates: Vec<(f32, Vec<PlayerId>)> = Vec::new();
    let mut seen: HashSet<Vec<PlayerId>> = HashSet::new();
    for k in 0..sets.len() {
        for lineup in sets.set(k).chunks_exact(lineup_len) {
            let key = sorted_key(lineup);
            if pool_keys.contains(&key) || !seen.insert(key) {
                continue;
            }
            candidates.push((eval.score_row(lineup), lineup.to_vec()));
        }
    }
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut replaced = 0;
    for (target, (score, lineup)) in targets.iter().zip(candidates) {
        if score <= pool_fit[*target] {
            break;
        }
        pool.row_mut(*target).copy_from_slice(&lineup);
        pool_fit[*target] = score;
        replaced += 1;
    }
    if replaced > 0 {
        debug!("pool evolution replaced {replaced} elite lineups");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_sets_keeps_top_fitness() {
        let mut sets = SetPopulation::new(1, 2);
        for i in 0..4u32 {
            sets.push_set(&[i * 2, i * 2 + 1]);
        }
        let fit = vec![1.0, 8.0, 3.0, 9.0];
        let (trimmed, tfit) = trim_sets(sets, fit, 2);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(tfit, vec![8.0, 9.0]);
        assert_eq!(trimmed.set(1), &[6, 7]);
    }

    #[test]
    fn evolve_pool_injects_better_lineups() {
        let points: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let eval = FitnessEval::new(&points, None);

        let mut pool = Population::new(2);
        pool.push(&[0, 1]); // 1 point
        pool.push(&[2, 3]); // 5 points
        let mut pool_fit = vec![1.0, 5.0];

        let mut sets = SetPopulation::new(1, 2);
        sets.push_set(&[8, 9]); // 17 points, better than anything pooled

        evolve_pool(&mut pool, &mut pool_fit, &sets, &eval, 1.0);
        assert!(pool_fit.contains(&17.0));
        assert!(pool.rows().any(|r| r == [8u32, 9].as_slice()));
    }
}
