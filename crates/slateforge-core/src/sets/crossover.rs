use crate::optimizer::fitness::FitnessEval;
use crate::types::{PlayerId, Population, SetPopulation};
use std::collections::HashSet;

/// Set-level crossover: for each pair of parent sets, children draw their
/// lineups by tournament over the combined 2N parent lineups, judged by
/// per-lineup projected points. A final dedupe pass replaces any repeated
/// lineup with a fresh draw from the lineup pool, so children keep the
/// intra-set distinctness invariant.
pub fn crossover_sets(
    sets: &SetPopulation,
    eval: &FitnessEval,
    tournament_size: usize,
    pool: &Population,
    rng: &mut fastrand::Rng,
) -> SetPopulation {
    let k = sets.len();
    let n = sets.n_lineups();
    let lineup_len = sets.lineup_len();
    let mut children = SetPopulation::with_capacity(n, lineup_len, k);

    let mut combined: Vec<&[PlayerId]> = Vec::with_capacity(2 * n);
    let mut scores: Vec<f32> = Vec::with_capacity(2 * n);

    let mut i = 0;
    while i < k {
        let partner = if i + 1 < k { i + 1 } else { 0 };

        combined.clear();
        scores.clear();
        for idx in 0..n {
            combined.push(sets.lineup(i, idx));
        }
        for idx in 0..n {
            combined.push(sets.lineup(partner, idx));
        }
        for lineup in &combined {
            scores.push(eval.score_row(lineup));
        }

        children.push_set(&build_child(&combined, &scores, n, lineup_len, tournament_size, pool, rng));
        if i + 1 < k {
            children.push_set(&build_child(
                &combined,
                &scores,
                n,
                lineup_len,
                tournament_size,
                pool,
                rng,
            ));
        }
        i += 2;
    }

    children
}

fn build_child(
    combined: &[&[PlayerId]],
    scores: &[f32],
    n: usize,
    lineup_len: usize,
    tournament_size: usize,
    pool: &Population,
    rng: &mut fastrand::Rng,
) -> Vec<PlayerId> {
    let t = tournament_size.clamp(1, combined.len());
    let mut child: Vec<PlayerId> = Vec::with_capacity(n * lineup_len);
    let mut used: HashSet<Vec<PlayerId>> = HashSet::with_capacity(n);

    for _ in 0..n {
        let mut best = rng.usize(0..combined.len());
        for _ in 1..t {
            let challenger = rng.usize(0..combined.len());
            if scores[challenger] > scores[best] {
                best = challenger;
            }
        }

        let winner = combined[best];
        if used.insert(sorted_key(winner)) {
            child.extend_from_slice(winner);
        } else {
            // duplicate winner: replace with a fresh pool lineup
            let replacement = fresh_from_pool(pool, &used, rng);
            used.insert(sorted_key(pool.row(replacement)));
            child.extend_from_slice(pool.row(replacement));
        }
    }
    child
}

fn sorted_key(row: &[PlayerId]) -> Vec<PlayerId> {
    let mut key = row.to_vec();
    key.sort_unstable();
    key
}

/// A pool row not already used by this child. Rejection sampling first,
/// then a linear scan from a random offset; the pool always holds at least
/// `n` distinct lineups, so the scan cannot fail.
fn fresh_from_pool(pool: &Population, used: &HashSet<Vec<PlayerId>>, rng: &mut fastrand::Rng) -> usize {
    for _ in 0..32 {
        let pick = rng.usize(0..pool.len());
        if !used.contains(&sorted_key(pool.row(pick))) {
            return pick;
        }
    }
    let offset = rng.usize(0..pool.len());
    for step in 0..pool.len() {
        let pick = (offset + step) % pool.len();
        if !used.contains(&sorted_key(pool.row(pick))) {
            return pick;
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_pool(rows: usize, lineup_len: usize) -> Population {
        let mut pool = Population::new(lineup_len);
        let mut row = Vec::new();
        for r in 0..rows {
            row.clear();
            for c in 0..lineup_len {
                row.push((r * lineup_len + c) as PlayerId);
            }
            pool.push(&row);
        }
        pool
    }

    #[test]
    fn children_keep_intra_set_distinctness() {
        let pool = toy_pool(100, 4);
        let points = vec![1.0; 400];
        let eval = FitnessEval::new(&points, None);

        // two parent sets that share lineups, forcing the dedupe path
        let mut sets = SetPopulation::new(3, 4);
        let shared = pool.row(0);
        let mut set_a: Vec<PlayerId> = Vec::new();
        set_a.extend_from_slice(shared);
        set_a.extend_from_slice(pool.row(1));
        set_a.extend_from_slice(pool.row(2));
        let mut set_b: Vec<PlayerId> = Vec::new();
        set_b.extend_from_slice(shared);
        set_b.extend_from_slice(pool.row(3));
        set_b.extend_from_slice(pool.row(4));
        sets.push_set(&set_a);
        sets.push_set(&set_b);

        let mut rng = fastrand::Rng::with_seed(13);
        for _ in 0..50 {
            let children = crossover_sets(&sets, &eval, 3, &pool, &mut rng);
            assert_eq!(children.len(), 2);
            for k in 0..children.len() {
                let mut keys: Vec<Vec<PlayerId>> = (0..3)
                    .map(|i| sorted_key(children.lineup(k, i)))
                    .collect();
                keys.sort();
                keys.dedup();
                assert_eq!(keys.len(), 3, "child set contains duplicate lineups");
            }
        }
    }

    #[test]
    fn tournament_favors_high_scoring_lineups() {
        let pool = toy_pool(50, 2);
        // lineup points: row r scores 2r + (2r+1)
        let points: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let eval = FitnessEval::new(&points, None);

        let mut sets = SetPopulation::new(2, 2);
        let mut low_high: Vec<PlayerId> = Vec::new();
        low_high.extend_from_slice(pool.row(0));
        low_high.extend_from_slice(pool.row(49));
        sets.push_set(&low_high);
        let mut mid: Vec<PlayerId> = Vec::new();
        mid.extend_from_slice(pool.row(20));
        mid.extend_from_slice(pool.row(21));
        sets.push_set(&mid);

        let mut rng = fastrand::Rng::with_seed(99);
        let mut best_picked = 0;
        for _ in 0..100 {
            let children = crossover_sets(&sets, &eval, 4, &pool, &mut rng);
            for k in 0..children.len() {
                for i in 0..2 {
                    if children.lineup(k, i) == pool.row(49) {
                        best_picked += 1;
                    }
                }
            }
        }
        assert!(best_picked > 100, "best lineup won only {best_picked} slots");
    }
}
