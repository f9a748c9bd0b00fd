use crate::similarity::{diversity_metrics, similarity, DiversityMetrics, SimilarityMethod};
use crate::types::{Lineup, Population};
use std::cmp::Ordering;
use tracing::debug;

/// Relaxation schedule: each time no candidate clears the overlap
/// threshold, multiply it by this factor.
const RELAX_FACTOR: f32 = 0.7;
/// Below this threshold diversity is abandoned and the remaining slots are
/// filled in plain fitness order.
const RELAX_FLOOR: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct PostSelectOptions {
    pub target_lineups: usize,
    pub diversity_weight: f32,
    pub min_overlap_threshold: f32,
    pub method: SimilarityMethod,
}

#[derive(Debug, Clone)]
pub struct PostSelection {
    pub lineups: Vec<Lineup>,
    pub scores: Vec<f32>,
    pub metrics: DiversityMetrics,
}

/// Greedy diverse subset selection over a final population.
///
/// Candidates are scored as `fitness - weight * max_similarity * scale`,
/// where `scale` (the population's median fitness) converts similarity into
/// fitness units, and only candidates whose maximum similarity to the
/// already-chosen set stays within `1 - threshold` qualify. When nothing
/// qualifies the threshold relaxes geometrically; past the floor, fitness
/// order alone fills the rest and the result is flagged `relaxed`.
pub fn select_diverse(pop: &Population, fit: &[f32], opts: &PostSelectOptions) -> PostSelection {
    let mut order: Vec<usize> = (0..fit.len()).collect();
    order.sort_by(|&a, &b| {
        fit[b]
            .partial_cmp(&fit[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let shortfall = pop.len() < opts.target_lineups;
    let target = opts.target_lineups.min(pop.len());
    if target == 0 {
        let mut metrics = diversity_metrics(&[], opts.method);
        metrics.shortfall = shortfall;
        return PostSelection {
            lineups: Vec::new(),
            scores: Vec::new(),
            metrics,
        };
    }

    let scale = median(fit);
    let mut selected: Vec<usize> = vec![order[0]];
    let mut threshold = opts.min_overlap_threshold;
    let mut relaxed = false;

    while selected.len() < target {
        let mut best: Option<(f32, usize)> = None;
        for &candidate in &order {
            if selected.contains(&candidate) {
                continue;
            }
            let max_sim = selected
                .iter()
                .map(|&s| similarity(opts.method, pop.row(candidate), pop.row(s)))
                .fold(0.0f32, f32::max);
            if max_sim <= 1.0 - threshold {
                let score = fit[candidate] - opts.diversity_weight * max_sim * scale;
                if best.is_none_or(|(b, _)| score > b) {
                    best = Some((score, candidate));
                }
            }
        }

        match best {
            Some((_, candidate)) => selected.push(candidate),
            None => {
                threshold *= RELAX_FACTOR;
                relaxed = true;
                debug!("post-selector relaxing overlap threshold to {threshold:.3}");
                if threshold < RELAX_FLOOR {
                    for &candidate in &order {
                        if selected.len() == target {
                            break;
                        }
                        if !selected.contains(&candidate) {
                            selected.push(candidate);
                        }
                    }
                }
            }
        }
    }

    let lineups: Vec<Lineup> = selected.iter().map(|&i| pop.row(i).to_vec()).collect();
    let scores: Vec<f32> = selected.iter().map(|&i| fit[i]).collect();
    let mut metrics = diversity_metrics(&lineups, opts.method);
    metrics.relaxed = relaxed;
    metrics.shortfall = shortfall;

    PostSelection {
        lineups,
        scores,
        metrics,
    }
}

fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
