use crate::error::{SfResult, SlateForgeError};
use crate::pool::PlayerPool;
use crate::types::PlayerId;

/// Categorical sampler over a fixed weight vector: cumulative sums plus
/// binary search. Every weighted draw in the engine goes through this.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    cum: Vec<f32>,
    total: f32,
}

impl WeightedSampler {
    /// Returns None when the weights are empty or sum to zero.
    pub fn new(weights: &[f32]) -> Option<Self> {
        let mut cum = Vec::with_capacity(weights.len());
        let mut total = 0.0f32;
        for &w in weights {
            total += w.max(0.0);
            cum.push(total);
        }
        if cum.is_empty() || total <= 0.0 {
            return None;
        }
        Some(Self { cum, total })
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> usize {
        let target = rng.f32() * self.total;
        // first index whose cumulative weight exceeds the target;
        // min() guards the target == total float edge
        self.cum
            .partition_point(|&c| c <= target)
            .min(self.cum.len() - 1)
    }
}

/// Per-position view over the player pool with a points-per-dollar
/// sampling distribution. Retains canonical ids so draws emit them directly.
#[derive(Debug, Clone)]
pub struct PositionView {
    pub name: String,
    pub ids: Vec<PlayerId>,
    pub points: Vec<f32>,
    pub salaries: Vec<u32>,
    pub prob: Vec<f32>,
    sampler: WeightedSampler,
}

impl PositionView {
    fn build(name: &str, entries: Vec<(PlayerId, f32, u32)>) -> Option<Self> {
        // zero-salary rows have undefined points-per-dollar
        let entries: Vec<_> = entries.into_iter().filter(|&(_, _, sal)| sal > 0).collect();
        if entries.is_empty() {
            return None;
        }

        let weights: Vec<f32> = entries
            .iter()
            .map(|&(_, pts, sal)| pts / sal as f32)
            .collect();
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let sampler = WeightedSampler::new(&weights)?;
        let prob = weights.iter().map(|w| w / total).collect();

        Some(Self {
            name: name.to_string(),
            ids: entries.iter().map(|&(id, _, _)| id).collect(),
            points: entries.iter().map(|&(_, pts, _)| pts).collect(),
            salaries: entries.iter().map(|&(_, _, sal)| sal).collect(),
            prob,
            sampler,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> PlayerId {
        self.ids[self.sampler.sample(rng)]
    }

    /// Appends `count` distinct ids to `out`, distinct among themselves.
    /// Falls back to an in-order walk of the view if rejection sampling
    /// stalls on a tiny view; callers guarantee `count <= len()`.
    pub fn sample_distinct(&self, count: usize, rng: &mut fastrand::Rng, out: &mut Vec<PlayerId>) {
        let start = out.len();
        let mut attempts = 0;
        while out.len() - start < count && attempts < count * 32 {
            let id = self.sample(rng);
            if !out[start..].contains(&id) {
                out.push(id);
            }
            attempts += 1;
        }
        if out.len() - start < count {
            for &id in &self.ids {
                if out.len() - start == count {
                    break;
                }
                if !out[start..].contains(&id) {
                    out.push(id);
                }
            }
        }
    }
}

/// All position views for a run, in posmap order (one view per posmap
/// entry, FLEX views built from the flex-eligible union).
#[derive(Debug, Clone)]
pub struct PositionPool {
    views: Vec<PositionView>,
}

impl PositionPool {
    pub fn build(
        pool: &PlayerPool,
        posmap: &[(String, usize)],
        posfilter: &[(String, f32)],
        flex_positions: &[String],
    ) -> SfResult<Self> {
        let thresh = |pos: &str| -> f32 {
            posfilter
                .iter()
                .find(|(p, _)| p == pos)
                .map(|&(_, t)| t)
                .unwrap_or(0.0)
        };

        let mut views = Vec::with_capacity(posmap.len());
        for (pos, count) in posmap {
            let min_points = thresh(pos);
            let entries: Vec<(PlayerId, f32, u32)> = if pos == "FLEX" {
                pool.players()
                    .iter()
                    .filter(|p| {
                        flex_positions.iter().any(|f| f == pool.position_name(p.pos))
                            && p.points >= min_points
                    })
                    .map(|p| (p.id, p.points, p.salary))
                    .collect()
            } else {
                if *count > 0 && pool.position_id(pos).is_none() {
                    return Err(SlateForgeError::Config(format!(
                        "posmap position '{pos}' does not exist in the player pool"
                    )));
                }
                pool.players()
                    .iter()
                    .filter(|p| pool.position_name(p.pos) == pos && p.points >= min_points)
                    .map(|p| (p.id, p.points, p.salary))
                    .collect()
            };

            let view = PositionView::build(pos, entries);
            match view {
                Some(v) if v.len() >= *count => views.push(v),
                _ if *count == 0 => {
                    // an unused posmap entry still gets a placeholder view
                    views.push(PositionView {
                        name: pos.clone(),
                        ids: Vec::new(),
                        points: Vec::new(),
                        salaries: Vec::new(),
                        prob: Vec::new(),
                        sampler: WeightedSampler::new(&[1.0]).unwrap(),
                    });
                }
                _ => {
                    return Err(SlateForgeError::Config(format!(
                        "pool cannot satisfy posmap: position '{pos}' needs {count} players \
                         above its threshold"
                    )));
                }
            }
        }

        Ok(Self { views })
    }

    pub fn view(&self, idx: usize) -> &PositionView {
        &self.views[idx]
    }

    pub fn views(&self) -> &[PositionView] {
        &self.views
    }

    pub fn view_by_name(&self, name: &str) -> Option<&PositionView> {
        self.views.iter().find(|v| v.name == name)
    }
}
