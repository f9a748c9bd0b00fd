use crate::layout::SlotLayout;
use crate::pospool::PositionPool;
use crate::types::Population;

/// Builds `n` lineups by weighted sampling from each slot's position view.
///
/// Draws within one position group are distinct, mirroring how a roster is
/// actually filled; collisions across groups (a FLEX slot landing on a player
/// already in a base slot) are left for validation to filter. The
/// points-per-dollar prior in the views is what makes the initial population
/// converge in tens of generations instead of thousands.
pub fn populate(
    pospool: &PositionPool,
    layout: &SlotLayout,
    n: usize,
    rng: &mut fastrand::Rng,
) -> Population {
    let lineup_len = layout.len();
    let mut pop = Population::with_capacity(lineup_len, n);
    let mut row = Vec::with_capacity(lineup_len);

    for _ in 0..n {
        row.clear();
        for &(view_idx, count) in layout.groups() {
            pospool.view(view_idx).sample_distinct(count, rng, &mut row);
        }
        pop.push(&row);
    }
    pop
}
