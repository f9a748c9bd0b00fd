use crate::layout::SlotLayout;
use crate::pool::PlayerPool;
use crate::types::{PlayerId, Population};
use std::collections::HashSet;

/// Row filters over a population, composed in a fixed order:
/// salary cap, intra-lineup duplicates, FLEX slot structure, global dedupe.
///
/// Validators only ever drop rows; they never repair them. The generational
/// loop's top-up step compensates for the shrinkage.
///
/// Non-FLEX slot structure is guaranteed by construction (populate, crossover
/// and mutate all draw slot `c` from slot `c`'s view), so the structural check
/// only has to look at FLEX slots.
pub struct Validator<'a> {
    salaries: &'a [u32],
    cap: u32,
    flex_slots: Vec<usize>,
    flex_eligible: Vec<bool>,
}

impl<'a> Validator<'a> {
    pub fn new(
        pool: &'a PlayerPool,
        layout: &SlotLayout,
        flex_positions: &[String],
        cap: u32,
    ) -> Self {
        let flex_eligible = pool
            .players()
            .iter()
            .map(|p| {
                flex_positions
                    .iter()
                    .any(|f| f == pool.position_name(p.pos))
            })
            .collect();
        Self {
            salaries: pool.salaries(),
            cap,
            flex_slots: layout.flex_slots(),
            flex_eligible,
        }
    }

    pub fn salary_cap(&self) -> u32 {
        self.cap
    }

    pub fn row_salary(&self, row: &[PlayerId]) -> u32 {
        row.iter().map(|&id| self.salaries[id as usize]).sum()
    }

    pub fn within_cap(&self, row: &[PlayerId]) -> bool {
        self.row_salary(row) <= self.cap
    }

    pub fn no_duplicates(row: &[PlayerId]) -> bool {
        let mut sorted: Vec<PlayerId> = row.to_vec();
        sorted.sort_unstable();
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    pub fn flex_structure_ok(&self, row: &[PlayerId]) -> bool {
        self.flex_slots
            .iter()
            .all(|&slot| self.flex_eligible[row[slot] as usize])
    }

    pub fn is_valid_row(&self, row: &[PlayerId]) -> bool {
        self.within_cap(row) && Self::no_duplicates(row) && self.flex_structure_ok(row)
    }

    pub fn validate(&self, pop: Population) -> Population {
        let pop = pop.filter_rows(|r| self.within_cap(r));
        let pop = pop.filter_rows(Self::no_duplicates);
        let pop = pop.filter_rows(|r| self.flex_structure_ok(r));
        dedupe_rows(pop)
    }
}

/// Drops rows whose sorted id vector duplicates an earlier row.
/// First occurrence wins, so output order is stable.
pub fn dedupe_rows(pop: Population) -> Population {
    let mut seen: HashSet<Vec<PlayerId>> = HashSet::with_capacity(pop.len());
    pop.filter_rows(|row| {
        let mut key: Vec<PlayerId> = row.to_vec();
        key.sort_unstable();
        seen.insert(key)
    })
}
