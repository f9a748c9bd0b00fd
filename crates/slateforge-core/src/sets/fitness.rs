use crate::optimizer::fitness::FitnessEval;
use crate::similarity::{mean_pairwise_similarity, SimilarityMethod};
use crate::types::SetPopulation;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct SetFitnessOptions {
    pub diversity_weight: f32,
    /// Converts mean pairwise similarity into point units so the penalty is
    /// commensurate with lineup totals.
    pub penalty_scale: f32,
    pub method: SimilarityMethod,
}

/// Set-level fitness: aggregate projected points of all lineups in the set
/// minus a diversity penalty. At weight zero the pairwise pass is skipped
/// entirely, which matters at large populations.
pub fn set_fitness(sets: &SetPopulation, eval: &FitnessEval, opts: &SetFitnessOptions) -> Vec<f32> {
    let n = sets.n_lineups();
    let lineup_len = sets.lineup_len();

    (0..sets.len())
        .into_par_iter()
        .map(|k| {
            let set = sets.set(k);
            let total: f32 = set
                .chunks_exact(lineup_len)
                .map(|lineup| eval.score_row(lineup))
                .sum();
            if opts.diversity_weight > 0.0 {
                let penalty =
                    mean_pairwise_similarity(set, n, lineup_len, opts.method) * opts.penalty_scale;
                total - opts.diversity_weight * penalty
            } else {
                total
            }
        })
        .collect()
}
