use crate::error::SlateForgeError;
use crate::types::{Lineup, PlayerId};
use itertools::Itertools;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMethod {
    Jaccard,
    Hamming,
}

impl FromStr for SimilarityMethod {
    type Err = SlateForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jaccard" => Ok(Self::Jaccard),
            "hamming" => Ok(Self::Hamming),
            other => Err(SlateForgeError::Config(format!(
                "unknown diversity_method '{other}' (expected jaccard or hamming)"
            ))),
        }
    }
}

/// Shared-player similarity: |a ∩ b| / |a ∪ b|. Lineups are short, so a
/// quadratic scan beats hashing here.
pub fn jaccard(a: &[PlayerId], b: &[PlayerId]) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let mut intersection = 0usize;
    for &x in a {
        if b.contains(&x) {
            intersection += 1;
        }
    }
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Slot-wise similarity: fraction of slots holding the same id.
pub fn hamming(a: &[PlayerId], b: &[PlayerId]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f32 / a.len() as f32
}

pub fn similarity(method: SimilarityMethod, a: &[PlayerId], b: &[PlayerId]) -> f32 {
    match method {
        SimilarityMethod::Jaccard => jaccard(a, b),
        SimilarityMethod::Hamming => hamming(a, b),
    }
}

/// Pairwise similarity summary over a group of lineups.
#[derive(Debug, Clone, Serialize)]
pub struct DiversityMetrics {
    pub avg_overlap: f32,
    pub min_overlap: f32,
    pub pairwise_matrix: Vec<Vec<f32>>,
    /// The post-selector had to relax its overlap threshold.
    pub relaxed: bool,
    /// Fewer lineups than requested could be produced.
    pub shortfall: bool,
}

pub fn diversity_metrics(lineups: &[Lineup], method: SimilarityMethod) -> DiversityMetrics {
    let n = lineups.len();
    let mut pairwise_matrix = vec![vec![0.0f32; n]; n];
    let mut sum = 0.0f32;
    let mut min = f32::MAX;
    let mut pairs = 0usize;

    for i in 0..n {
        pairwise_matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let sim = similarity(method, &lineups[i], &lineups[j]);
            pairwise_matrix[i][j] = sim;
            pairwise_matrix[j][i] = sim;
            sum += sim;
            min = min.min(sim);
            pairs += 1;
        }
    }

    DiversityMetrics {
        avg_overlap: if pairs > 0 { sum / pairs as f32 } else { 0.0 },
        min_overlap: if pairs > 0 { min } else { 0.0 },
        pairwise_matrix,
        relaxed: false,
        shortfall: false,
    }
}

/// Mean pairwise similarity inside one flat set of `n` lineups of length `l`.
pub fn mean_pairwise_similarity(set: &[PlayerId], n: usize, l: usize, method: SimilarityMethod) -> f32 {
    if n <= 1 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    let mut pairs = 0usize;
    for (i, j) in (0..n).tuple_combinations() {
        let a = &set[i * l..(i + 1) * l];
        let b = &set[j * l..(j + 1) * l];
        sum += similarity(method, a, b);
        pairs += 1;
    }
    sum / pairs as f32
}
