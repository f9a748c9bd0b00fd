use crate::error::SlateForgeError;
use crate::pospool::WeightedSampler;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMethod {
    /// Top-n by fitness, ties broken by row index.
    Fittest,
    /// n draws with replacement, probability proportional to fitness.
    Roulette,
    /// n tournaments of `tournament_size` uniform draws, argmax each.
    Tournament,
    /// Rank-weighted sampling without replacement.
    Rank,
    /// Stochastic universal sampling: evenly spaced wheel pointers.
    Sus,
}

impl FromStr for SelectMethod {
    type Err = SlateForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fittest" => Ok(Self::Fittest),
            "roulette" => Ok(Self::Roulette),
            "tournament" => Ok(Self::Tournament),
            "rank" => Ok(Self::Rank),
            "sus" => Ok(Self::Sus),
            other => Err(SlateForgeError::Config(format!(
                "unknown selection method '{other}'"
            ))),
        }
    }
}

/// Selects `n` row indices from a population described only by its fitness
/// vector. Fitness is assumed non-negative; roulette shifts by the minimum
/// if it is not.
pub fn select(
    fit: &[f32],
    n: usize,
    method: SelectMethod,
    tournament_size: usize,
    rng: &mut fastrand::Rng,
) -> Vec<usize> {
    if fit.is_empty() || n == 0 {
        return Vec::new();
    }
    match method {
        SelectMethod::Fittest => fittest(fit, n),
        SelectMethod::Roulette => roulette(fit, n, rng),
        SelectMethod::Tournament => tournament(fit, n, tournament_size, rng),
        SelectMethod::Rank => rank(fit, n, rng),
        SelectMethod::Sus => sus(fit, n, rng),
    }
}

fn by_fitness_desc(fit: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fit.len()).collect();
    order.sort_by(|&a, &b| {
        fit[b]
            .partial_cmp(&fit[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

fn fittest(fit: &[f32], n: usize) -> Vec<usize> {
    let mut order = by_fitness_desc(fit);
    order.truncate(n.min(fit.len()));
    order
}

fn roulette(fit: &[f32], n: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let min = fit.iter().copied().fold(f32::MAX, f32::min);
    let shifted: Vec<f32> = if min < 0.0 {
        fit.iter().map(|f| f - min).collect()
    } else {
        fit.to_vec()
    };
    match WeightedSampler::new(&shifted) {
        Some(sampler) => (0..n).map(|_| sampler.sample(rng)).collect(),
        // all-zero fitness degenerates to uniform
        None => (0..n).map(|_| rng.usize(0..fit.len())).collect(),
    }
}

fn tournament(fit: &[f32], n: usize, tournament_size: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let t = tournament_size.clamp(1, fit.len());
    (0..n)
        .map(|_| {
            let mut best = rng.usize(0..fit.len());
            for _ in 1..t {
                let challenger = rng.usize(0..fit.len());
                if fit[challenger] > fit[best] {
                    best = challenger;
                }
            }
            best
        })
        .collect()
}

fn rank(fit: &[f32], n: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let len = fit.len();
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| {
        fit[a]
            .partial_cmp(&fit[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut rank_weight = vec![0.0f32; len];
    for (pos, &i) in order.iter().enumerate() {
        rank_weight[i] = (pos + 1) as f32;
    }

    // weighted sampling without replacement: draw a key u^(1/w) per row and
    // keep the n largest
    let mut keyed: Vec<(f32, usize)> = rank_weight
        .iter()
        .enumerate()
        .map(|(i, &w)| (rng.f32().powf(1.0 / w), i))
        .collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().take(n.min(len)).map(|(_, i)| i).collect()
}

fn sus(fit: &[f32], n: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let mut cum = Vec::with_capacity(fit.len());
    let mut total = 0.0f32;
    for &f in fit {
        total += f.max(0.0);
        cum.push(total);
    }
    if total <= 0.0 {
        return (0..n).map(|_| rng.usize(0..fit.len())).collect();
    }

    let step = total / n as f32;
    let start = rng.f32() * step;
    (0..n)
        .map(|i| {
            let pointer = start + step * i as f32;
            cum.partition_point(|&c| c <= pointer).min(fit.len() - 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fittest_is_sorted_with_index_tiebreak() {
        let fit = vec![5.0, 9.0, 9.0, 1.0];
        assert_eq!(select(&fit, 3, SelectMethod::Fittest, 2, &mut fastrand::Rng::with_seed(0)), vec![1, 2, 0]);
    }

    #[test]
    fn tournament_prefers_high_fitness() {
        let fit = vec![1.0, 100.0, 1.0, 1.0];
        let mut rng = fastrand::Rng::with_seed(3);
        let picks = select(&fit, 200, SelectMethod::Tournament, 4, &mut rng);
        let winners = picks.iter().filter(|&&i| i == 1).count();
        assert!(winners > 120, "expected index 1 to dominate, won {winners}");
    }

    #[test]
    fn roulette_handles_negative_fitness() {
        let fit = vec![-5.0, 10.0];
        let mut rng = fastrand::Rng::with_seed(7);
        let picks = select(&fit, 50, SelectMethod::Roulette, 2, &mut rng);
        assert!(picks.iter().all(|&i| i < 2));
        assert!(picks.contains(&1));
    }

    #[test]
    fn rank_and_sus_return_requested_counts() {
        let fit = vec![3.0, 1.0, 2.0, 5.0, 4.0];
        let mut rng = fastrand::Rng::with_seed(21);
        assert_eq!(select(&fit, 3, SelectMethod::Rank, 2, &mut rng).len(), 3);
        assert_eq!(select(&fit, 5, SelectMethod::Sus, 2, &mut rng).len(), 5);
    }

    #[test]
    fn selection_is_deterministic_under_seed() {
        let fit = vec![3.0, 1.0, 2.0, 5.0, 4.0];
        for method in [
            SelectMethod::Roulette,
            SelectMethod::Tournament,
            SelectMethod::Rank,
            SelectMethod::Sus,
        ] {
            let a = select(&fit, 4, method, 2, &mut fastrand::Rng::with_seed(42));
            let b = select(&fit, 4, method, 2, &mut fastrand::Rng::with_seed(42));
            assert_eq!(a, b);
        }
    }
}
