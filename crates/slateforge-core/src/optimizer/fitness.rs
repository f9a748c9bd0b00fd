use crate::types::{PlayerId, Population};
use rayon::prelude::*;

/// Lineup scoring: gather projected points by id and sum the row.
///
/// `slot_weights` overrides the per-slot coefficient vector for variants
/// like captain mode (slot 0 scored at 1.5x); when absent every slot
/// contributes its raw projection.
pub struct FitnessEval<'a> {
    points: &'a [f32],
    slot_weights: Option<Vec<f32>>,
}

impl<'a> FitnessEval<'a> {
    pub fn new(points: &'a [f32], slot_weights: Option<Vec<f32>>) -> Self {
        Self {
            points,
            slot_weights,
        }
    }

    pub fn score_row(&self, row: &[PlayerId]) -> f32 {
        match &self.slot_weights {
            Some(weights) => row
                .iter()
                .zip(weights)
                .map(|(&id, &w)| self.points[id as usize] * w)
                .sum(),
            None => row.iter().map(|&id| self.points[id as usize]).sum(),
        }
    }

    /// One score per row. Pure per-row work, so the population dimension is
    /// safe to parallelize without affecting reproducibility.
    pub fn score_population(&self, pop: &Population) -> Vec<f32> {
        let lineup_len = pop.lineup_len();
        pop.as_slice()
            .par_chunks(lineup_len)
            .map(|row| self.score_row(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_point_sums() {
        let points = vec![10.0, 20.0, 30.0];
        let eval = FitnessEval::new(&points, None);
        let mut pop = Population::new(2);
        pop.push(&[0, 2]);
        pop.push(&[1, 2]);

        assert_eq!(eval.score_population(&pop), vec![40.0, 50.0]);
    }

    #[test]
    fn slot_weights_scale_per_slot() {
        let points = vec![10.0, 20.0];
        let eval = FitnessEval::new(&points, Some(vec![1.5, 1.0]));
        assert_eq!(eval.score_row(&[0, 1]), 35.0);
    }

    #[test]
    fn fitness_is_pure() {
        let points = vec![1.0, 2.0, 3.0, 4.0];
        let eval = FitnessEval::new(&points, None);
        let mut pop = Population::new(2);
        pop.push(&[0, 3]);
        pop.push(&[1, 2]);

        assert_eq!(eval.score_population(&pop), eval.score_population(&pop));
    }
}
