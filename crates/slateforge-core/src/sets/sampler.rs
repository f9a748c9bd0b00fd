use crate::error::{SfResult, SlateForgeError};
use crate::layout::SlotLayout;
use crate::optimizer::populate::populate;
use crate::optimizer::validate::{dedupe_rows, Validator};
use crate::pospool::PositionPool;
use crate::similarity::{similarity, SimilarityMethod};
use crate::types::{PlayerId, Population, SetPopulation};
use tracing::{debug, warn};

const POOL_BUILD_ATTEMPTS: usize = 12;
/// Above this workload (pool rows x lineups per set) the pairwise
/// similarity-based sampler is too slow; fingerprint clustering takes over.
pub const FINGERPRINT_WORKLOAD_THRESHOLD: usize = 1000;

const FINGERPRINT_MOD: u64 = 100_000;
const PRODUCT_PRIME: u64 = 97;
/// Candidates examined per pick in the similarity-based sampler.
const SIMILARITY_CANDIDATES: usize = 100;

/// Builds the large validated lineup pool the set engine samples from.
/// Uses the same populate + validate path as the single-lineup loop so the
/// pool has the same stationary distribution over valid lineups.
pub fn build_lineup_pool(
    pospool: &PositionPool,
    layout: &SlotLayout,
    validator: &Validator,
    pool_size: usize,
    rng: &mut fastrand::Rng,
) -> SfResult<Population> {
    let mut pool = Population::new(layout.len());
    for _ in 0..POOL_BUILD_ATTEMPTS {
        let deficit = pool_size - pool.len();
        let fresh = validator.validate(populate(pospool, layout, deficit, rng));
        pool.extend_from(&fresh);
        pool = dedupe_rows(pool);
        if pool.len() >= pool_size {
            break;
        }
    }
    if pool.is_empty() {
        return Err(SlateForgeError::Infeasible(
            "no valid lineup satisfies the position map under the salary cap".into(),
        ));
    }
    pool.truncate_rows(pool_size);
    Ok(pool)
}

/// Compact 4-tuple summary of a lineup. Similar lineups produce equal
/// tuples far more often than dissimilar ones, which is all the clustering
/// needs: it is a locality-sensitive hash, not a similarity measure.
pub fn fingerprint(row: &[PlayerId]) -> [u32; 4] {
    let len = row.len();
    let mid = len / 2;
    let f1 = row[..mid].iter().map(|&x| x as u64).sum::<u64>() % FINGERPRINT_MOD;
    let f2 = row[mid..].iter().map(|&x| x as u64).sum::<u64>() % FINGERPRINT_MOD;
    let f3 = row.iter().fold(0u64, |acc, &x| acc ^ x as u64) % FINGERPRINT_MOD;
    let f4 = if len >= 3 {
        row[..3]
            .iter()
            .fold(1u64, |acc, &x| acc * (x as u64 % PRODUCT_PRIME) % PRODUCT_PRIME)
    } else {
        row.iter().map(|&x| x as u64).sum::<u64>() % PRODUCT_PRIME
    };
    [f1 as u32, f2 as u32, f3 as u32, f4 as u32]
}

/// Hash-buckets pool rows by fingerprint. Empty buckets are discarded, so
/// the result may be shorter than `n_clusters`.
pub fn cluster_by_fingerprint(pool: &Population, n_clusters: usize) -> Vec<Vec<usize>> {
    let n_clusters = n_clusters.max(1);
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); n_clusters];
    for (i, row) in pool.rows().enumerate() {
        let f = fingerprint(row);
        let hash = (f[0] as u64 * 7 + f[1] as u64 * 11 + f[2] as u64 * 13 + f[3] as u64 * 17)
            % n_clusters as u64;
        clusters[hash as usize].push(i);
    }
    clusters.retain(|c| !c.is_empty());
    clusters
}

pub fn default_cluster_count(pool_len: usize, target_lineups: usize) -> usize {
    (target_lineups * 8)
        .min((pool_len / 5).max(1))
        .clamp(1, 2000)
}

/// Seeds `k` sets of `n` lineups. Picks the fingerprint path for large
/// workloads and the exact pairwise path for small ones.
pub fn sample_initial_sets(
    pool: &Population,
    k: usize,
    n: usize,
    n_clusters: usize,
    method: SimilarityMethod,
    rng: &mut fastrand::Rng,
) -> SetPopulation {
    if pool.len() * n > FINGERPRINT_WORKLOAD_THRESHOLD {
        sample_diverse_sets(pool, k, n, n_clusters, rng)
    } else {
        sample_sets_similarity(pool, k, n, method, rng)
    }
}

/// Fingerprint-clustered diverse sampling: each set draws its `n` lineups
/// from `n` distinct clusters (permuted round-robin when clusters run
/// short), uniformly without replacement inside a cluster. Near-linear in
/// `k * n`. Falls back to uniform sampling when clustering degenerates.
pub fn sample_diverse_sets(
    pool: &Population,
    k: usize,
    n: usize,
    n_clusters: usize,
    rng: &mut fastrand::Rng,
) -> SetPopulation {
    let clusters = cluster_by_fingerprint(pool, n_clusters);
    if clusters.len() < n {
        warn!(
            "fingerprint clustering yielded {} non-empty clusters for {} lineups per set, \
             falling back to uniform sampling",
            clusters.len(),
            n
        );
        return sample_sets_uniform(pool, k, n, rng);
    }
    debug!("sampling {k} sets from {} fingerprint clusters", clusters.len());

    let lineup_len = pool.lineup_len();
    let mut sets = SetPopulation::with_capacity(n, lineup_len, k);
    let mut cluster_order: Vec<usize> = (0..clusters.len()).collect();
    let mut buf: Vec<PlayerId> = Vec::with_capacity(n * lineup_len);
    let mut used: Vec<usize> = Vec::with_capacity(n);

    for _ in 0..k {
        rng.shuffle(&mut cluster_order);
        buf.clear();
        used.clear();
        for slot in 0..n {
            let cluster = &clusters[cluster_order[slot % cluster_order.len()]];
            let row_idx = draw_unused_from(cluster, &used, pool.len(), rng);
            used.push(row_idx);
            buf.extend_from_slice(pool.row(row_idx));
        }
        sets.push_set(&buf);
    }
    sets
}

/// Uniform draw from `candidates` avoiding `used`; widens to the whole pool
/// if the cluster is exhausted.
fn draw_unused_from(
    candidates: &[usize],
    used: &[usize],
    pool_len: usize,
    rng: &mut fastrand::Rng,
) -> usize {
    if !candidates.is_empty() {
        for _ in 0..8 {
            let pick = candidates[rng.usize(0..candidates.len())];
            if !used.contains(&pick) {
                return pick;
            }
        }
    }
    let mut pick = rng.usize(0..pool_len);
    let mut tries = 0;
    while used.contains(&pick) && tries < 32 {
        pick = rng.usize(0..pool_len);
        tries += 1;
    }
    pick
}

/// Plain uniform sets, distinct rows within a set. The fallback when
/// clustering cannot provide enough buckets.
pub fn sample_sets_uniform(
    pool: &Population,
    k: usize,
    n: usize,
    rng: &mut fastrand::Rng,
) -> SetPopulation {
    let lineup_len = pool.lineup_len();
    let mut sets = SetPopulation::with_capacity(n, lineup_len, k);
    let mut buf: Vec<PlayerId> = Vec::with_capacity(n * lineup_len);
    let mut used: Vec<usize> = Vec::with_capacity(n);

    for _ in 0..k {
        buf.clear();
        used.clear();
        for _ in 0..n {
            let pick = draw_unused_from(&[], &used, pool.len(), rng);
            used.push(pick);
            buf.extend_from_slice(pool.row(pick));
        }
        sets.push_set(&buf);
    }
    sets
}

/// Exact greedy sampler for small workloads: each added lineup is the
/// candidate (from a bounded random sample) with the lowest maximum
/// similarity to the lineups already in the set.
pub fn sample_sets_similarity(
    pool: &Population,
    k: usize,
    n: usize,
    method: SimilarityMethod,
    rng: &mut fastrand::Rng,
) -> SetPopulation {
    let lineup_len = pool.lineup_len();
    let mut sets = SetPopulation::with_capacity(n, lineup_len, k);
    let mut chosen: Vec<usize> = Vec::with_capacity(n);

    for _ in 0..k {
        chosen.clear();
        chosen.push(rng.usize(0..pool.len()));

        while chosen.len() < n {
            let mut best: Option<(f32, usize)> = None;
            for _ in 0..SIMILARITY_CANDIDATES.min(pool.len()) {
                let candidate = rng.usize(0..pool.len());
                if chosen.contains(&candidate) {
                    continue;
                }
                let max_sim = chosen
                    .iter()
                    .map(|&s| similarity(method, pool.row(candidate), pool.row(s)))
                    .fold(0.0f32, f32::max);
                if best.is_none_or(|(b, _)| max_sim < b) {
                    best = Some((max_sim, candidate));
                }
            }
            match best {
                Some((_, candidate)) => chosen.push(candidate),
                None => chosen.push(draw_unused_from(&[], &chosen, pool.len(), rng)),
            }
        }

        let mut buf: Vec<PlayerId> = Vec::with_capacity(n * lineup_len);
        for &idx in &chosen {
            buf.extend_from_slice(pool.row(idx));
        }
        sets.push_set(&buf);
    }
    sets
}
