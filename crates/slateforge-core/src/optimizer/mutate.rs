use crate::layout::SlotLayout;
use crate::pospool::PositionPool;
use crate::types::Population;

/// Per-cell mutation: with probability `rate`, resample the cell from the
/// position view that owns its slot (FLEX slots resample from the FLEX
/// view). Slot structure is preserved by construction; any duplicates or
/// cap overruns this introduces are filtered by the next validation pass.
pub fn mutate(
    pop: &mut Population,
    layout: &SlotLayout,
    pospool: &PositionPool,
    rate: f32,
    rng: &mut fastrand::Rng,
) {
    if rate <= 0.0 {
        return;
    }
    let lineup_len = layout.len();
    for row in pop.rows_mut() {
        for c in 0..lineup_len {
            if rng.f32() < rate {
                row[c] = pospool.view(layout.view_of_slot(c)).sample(rng);
            }
        }
    }
}
