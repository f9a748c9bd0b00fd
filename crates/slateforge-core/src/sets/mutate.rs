use crate::error::SlateForgeError;
use crate::layout::SlotLayout;
use crate::pospool::{PositionPool, WeightedSampler};
use crate::types::{Population, SetPopulation};
use std::str::FromStr;

/// How aggressively set mutation leans on pool injection (replacing a whole
/// lineup from the pool) versus single-player swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationIntensity {
    Low,
    Medium,
    High,
    /// Starts low and rises as generations pass without improvement.
    Adaptive,
}

impl FromStr for MutationIntensity {
    type Err = SlateForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "adaptive" => Ok(Self::Adaptive),
            other => Err(SlateForgeError::Config(format!(
                "unknown mutation_intensity '{other}'"
            ))),
        }
    }
}

impl MutationIntensity {
    fn injection_probability(self, n_unimproved: usize) -> f32 {
        match self {
            Self::Low => 0.1,
            Self::Medium => 0.25,
            Self::High => 0.5,
            Self::Adaptive => (0.1 + 0.02 * n_unimproved as f32).min(0.5),
        }
    }
}

/// Per-lineup set mutation. With probability `rate` a lineup either gets a
/// single slot resampled from its position view, or is replaced wholesale
/// by a fitness-weighted draw from the lineup pool ("pool injection").
#[allow(clippy::too_many_arguments)]
pub fn mutate_sets(
    sets: &mut SetPopulation,
    rate: f32,
    intensity: MutationIntensity,
    n_unimproved: usize,
    layout: &SlotLayout,
    pospool: &PositionPool,
    pool: &Population,
    pool_sampler: Option<&WeightedSampler>,
    rng: &mut fastrand::Rng,
) {
    if rate <= 0.0 {
        return;
    }
    let n = sets.n_lineups();
    let lineup_len = sets.lineup_len();
    let injection = intensity.injection_probability(n_unimproved);

    for k in 0..sets.len() {
        for i in 0..n {
            if rng.f32() >= rate {
                continue;
            }
            let inject = rng.f32() < injection;
            let pick = if inject {
                Some(match pool_sampler {
                    Some(sampler) => sampler.sample(rng),
                    None => rng.usize(0..pool.len()),
                })
            } else {
                None
            };

            let set = sets.set_mut(k);
            let lineup = &mut set[i * lineup_len..(i + 1) * lineup_len];
            match pick {
                Some(pool_row) => lineup.copy_from_slice(pool.row(pool_row)),
                None => {
                    let slot = rng.usize(0..lineup_len);
                    lineup[slot] = pospool.view(layout.view_of_slot(slot)).sample(rng);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{PlayerPool, PlayerRow};
    use crate::types::PlayerId;

    fn row(name: &str, pos: &str, salary: u32, points: f32) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            team: None,
            position: pos.to_string(),
            salary,
            points,
        }
    }

    #[test]
    fn adaptive_intensity_ramps_with_stagnation() {
        let fresh = MutationIntensity::Adaptive.injection_probability(0);
        let stuck = MutationIntensity::Adaptive.injection_probability(30);
        assert!(fresh < stuck);
        assert!(stuck <= 0.5);
    }

    #[test]
    fn swaps_stay_inside_the_slot_view() {
        let pool = PlayerPool::from_rows(
            vec![
                row("q1", "QB", 6000, 18.0),
                row("q2", "QB", 5000, 14.0),
                row("r1", "RB", 7000, 16.0),
                row("r2", "RB", 5000, 10.0),
            ],
            0.0,
        )
        .unwrap();
        let posmap = vec![("QB".to_string(), 1), ("RB".to_string(), 1)];
        let pospool = PositionPool::build(&pool, &posmap, &[], &[]).unwrap();
        let layout = SlotLayout::build(&posmap);

        // the lineup pool rows double as valid replacement material
        let mut lineup_pool = Population::new(2);
        lineup_pool.push(&[0, 2]);
        lineup_pool.push(&[1, 3]);

        let mut sets = SetPopulation::new(2, 2);
        sets.push_set(&[0, 2, 1, 3]);

        let mut rng = fastrand::Rng::with_seed(4);
        for _ in 0..200 {
            mutate_sets(
                &mut sets,
                1.0,
                MutationIntensity::Medium,
                0,
                &layout,
                &pospool,
                &lineup_pool,
                None,
                &mut rng,
            );
            for i in 0..2 {
                let lineup = sets.lineup(0, i);
                let qb: Vec<PlayerId> = vec![0, 1];
                assert!(qb.contains(&lineup[0]), "QB slot held {}", lineup[0]);
                assert!(lineup[1] == 2 || lineup[1] == 3, "RB slot held {}", lineup[1]);
            }
        }
    }
}
