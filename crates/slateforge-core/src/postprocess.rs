use crate::types::{Lineup, PlayerId};
use std::collections::HashMap;

/// Player exposure across a group of lineups: how many of the returned
/// lineups each player appears in, highest first (ties by id).
pub fn exposure(lineups: &[Lineup]) -> Vec<(PlayerId, usize)> {
    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for lineup in lineups {
        for &id in lineup {
            *counts.entry(id).or_default() += 1;
        }
    }
    let mut out: Vec<(PlayerId, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    out
}
