/// Canonical player identifier: the row index into the player pool.
/// Dense in `[0, pool_len)` and stable for the duration of a run.
pub type PlayerId = u32;

/// Compact position identifier, interned by the pool.
pub type PosId = u8;

/// A full roster: one player id per slot, in canonical slot order.
pub type Lineup = Vec<PlayerId>;

/// A population of lineups stored as a flat row-major matrix.
///
/// Rows are independent lineups; every row has the same length. Operators
/// work on rows via slices so the matrix never reallocates per lineup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    data: Vec<PlayerId>,
    lineup_len: usize,
}

impl Population {
    pub fn new(lineup_len: usize) -> Self {
        Self {
            data: Vec::new(),
            lineup_len,
        }
    }

    pub fn with_capacity(lineup_len: usize, rows: usize) -> Self {
        Self {
            data: Vec::with_capacity(lineup_len * rows),
            lineup_len,
        }
    }

    pub fn lineup_len(&self) -> usize {
        self.lineup_len
    }

    pub fn len(&self) -> usize {
        if self.lineup_len == 0 {
            0
        } else {
            self.data.len() / self.lineup_len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, r: usize) -> &[PlayerId] {
        &self.data[r * self.lineup_len..(r + 1) * self.lineup_len]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [PlayerId] {
        &mut self.data[r * self.lineup_len..(r + 1) * self.lineup_len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[PlayerId]> {
        self.data.chunks_exact(self.lineup_len)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [PlayerId]> {
        self.data.chunks_exact_mut(self.lineup_len)
    }

    pub fn as_slice(&self) -> &[PlayerId] {
        &self.data
    }

    pub fn push(&mut self, row: &[PlayerId]) {
        debug_assert_eq!(row.len(), self.lineup_len);
        self.data.extend_from_slice(row);
    }

    pub fn extend_from(&mut self, other: &Population) {
        debug_assert_eq!(other.lineup_len, self.lineup_len);
        self.data.extend_from_slice(&other.data);
    }

    /// New population containing the listed rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Population {
        let mut out = Population::with_capacity(self.lineup_len, indices.len());
        for &i in indices {
            out.push(self.row(i));
        }
        out
    }

    /// New population containing only rows where `keep` returns true.
    pub fn filter_rows<F: FnMut(&[PlayerId]) -> bool>(&self, mut keep: F) -> Population {
        let mut out = Population::new(self.lineup_len);
        for row in self.rows() {
            if keep(row) {
                out.push(row);
            }
        }
        out
    }

    pub fn to_lineups(&self) -> Vec<Lineup> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    pub fn truncate_rows(&mut self, rows: usize) {
        let max = rows * self.lineup_len;
        if self.data.len() > max {
            self.data.truncate(max);
        }
    }
}

/// A population of lineup *sets* stored as a flat `[K x N x L]` matrix.
/// One set is `N` lineups evolved together as a single individual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPopulation {
    data: Vec<PlayerId>,
    n_lineups: usize,
    lineup_len: usize,
}

impl SetPopulation {
    pub fn new(n_lineups: usize, lineup_len: usize) -> Self {
        Self {
            data: Vec::new(),
            n_lineups,
            lineup_len,
        }
    }

    pub fn with_capacity(n_lineups: usize, lineup_len: usize, sets: usize) -> Self {
        Self {
            data: Vec::with_capacity(n_lineups * lineup_len * sets),
            n_lineups,
            lineup_len,
        }
    }

    pub fn n_lineups(&self) -> usize {
        self.n_lineups
    }

    pub fn lineup_len(&self) -> usize {
        self.lineup_len
    }

    fn set_stride(&self) -> usize {
        self.n_lineups * self.lineup_len
    }

    pub fn len(&self) -> usize {
        let stride = self.set_stride();
        if stride == 0 {
            0
        } else {
            self.data.len() / stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set(&self, k: usize) -> &[PlayerId] {
        let stride = self.set_stride();
        &self.data[k * stride..(k + 1) * stride]
    }

    pub fn set_mut(&mut self, k: usize) -> &mut [PlayerId] {
        let stride = self.set_stride();
        &mut self.data[k * stride..(k + 1) * stride]
    }

    pub fn lineup(&self, k: usize, i: usize) -> &[PlayerId] {
        let base = k * self.set_stride() + i * self.lineup_len;
        &self.data[base..base + self.lineup_len]
    }

    pub fn sets(&self) -> impl Iterator<Item = &[PlayerId]> {
        self.data.chunks_exact(self.set_stride())
    }

    pub fn push_set(&mut self, set: &[PlayerId]) {
        debug_assert_eq!(set.len(), self.set_stride());
        self.data.extend_from_slice(set);
    }

    pub fn select_sets(&self, indices: &[usize]) -> SetPopulation {
        let mut out = SetPopulation::with_capacity(self.n_lineups, self.lineup_len, indices.len());
        for &i in indices {
            out.push_set(self.set(i));
        }
        out
    }

    /// The lineups of one set as owned vectors.
    pub fn set_lineups(&self, k: usize) -> Vec<Lineup> {
        (0..self.n_lineups)
            .map(|i| self.lineup(k, i).to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_row_accessors() {
        let mut pop = Population::new(3);
        pop.push(&[1, 2, 3]);
        pop.push(&[4, 5, 6]);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.row(1), &[4, 5, 6]);

        let picked = pop.select_rows(&[1, 0]);
        assert_eq!(picked.row(0), &[4, 5, 6]);
        assert_eq!(picked.row(1), &[1, 2, 3]);
    }

    #[test]
    fn set_population_indexing() {
        let mut sets = SetPopulation::new(2, 3);
        sets.push_set(&[1, 2, 3, 4, 5, 6]);
        sets.push_set(&[7, 8, 9, 10, 11, 12]);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.lineup(0, 1), &[4, 5, 6]);
        assert_eq!(sets.lineup(1, 0), &[7, 8, 9]);
    }
}
