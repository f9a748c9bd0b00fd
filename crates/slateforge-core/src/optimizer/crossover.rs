use crate::error::SlateForgeError;
use crate::types::Population;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverMethod {
    Uniform,
    OnePoint,
    TwoPoint,
}

impl FromStr for CrossoverMethod {
    type Err = SlateForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "one_point" => Ok(Self::OnePoint),
            "two_point" => Ok(Self::TwoPoint),
            other => Err(SlateForgeError::Config(format!(
                "unknown crossover method '{other}'"
            ))),
        }
    }
}

/// Crosses the selected population pairwise: the first half are fathers,
/// the second half mothers, pair `i` producing two children.
///
/// All methods exchange whole columns between same-shape parents, so a
/// child's slot `c` always comes from some parent's slot `c` and therefore
/// from the correct position view. Structure violations are impossible here;
/// duplicates and cap overruns fall to the next validation pass.
pub fn crossover(parents: &Population, method: CrossoverMethod, rng: &mut fastrand::Rng) -> Population {
    let lineup_len = parents.lineup_len();
    let half = parents.len() / 2;
    let mut children = Population::with_capacity(lineup_len, half * 2);

    let mut child1 = vec![0; lineup_len];
    let mut child2 = vec![0; lineup_len];

    for i in 0..half {
        let father = parents.row(i);
        let mother = parents.row(half + i);

        match method {
            CrossoverMethod::Uniform => {
                for c in 0..lineup_len {
                    if rng.bool() {
                        child1[c] = father[c];
                        child2[c] = mother[c];
                    } else {
                        child1[c] = mother[c];
                        child2[c] = father[c];
                    }
                }
            }
            CrossoverMethod::OnePoint => {
                let point = if lineup_len > 1 {
                    rng.usize(1..lineup_len)
                } else {
                    0
                };
                child1[..point].copy_from_slice(&father[..point]);
                child1[point..].copy_from_slice(&mother[point..]);
                child2[..point].copy_from_slice(&mother[..point]);
                child2[point..].copy_from_slice(&father[point..]);
            }
            CrossoverMethod::TwoPoint => {
                let (p1, p2) = if lineup_len > 2 {
                    let a = rng.usize(1..lineup_len);
                    let mut b = rng.usize(1..lineup_len);
                    while b == a {
                        b = rng.usize(1..lineup_len);
                    }
                    (a.min(b), a.max(b))
                } else {
                    (0, lineup_len)
                };
                child1[..p1].copy_from_slice(&father[..p1]);
                child1[p1..p2].copy_from_slice(&mother[p1..p2]);
                child1[p2..].copy_from_slice(&father[p2..]);
                child2[..p1].copy_from_slice(&mother[..p1]);
                child2[p1..p2].copy_from_slice(&father[p1..p2]);
                child2[p2..].copy_from_slice(&mother[p2..]);
            }
        }

        children.push(&child1);
        children.push(&child2);
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents() -> Population {
        let mut pop = Population::new(4);
        pop.push(&[1, 2, 3, 4]);
        pop.push(&[1, 2, 3, 4]);
        pop.push(&[5, 6, 7, 8]);
        pop.push(&[5, 6, 7, 8]);
        pop
    }

    #[test]
    fn children_take_each_slot_from_a_parent() {
        let pop = parents();
        let mut rng = fastrand::Rng::with_seed(5);

        for method in [
            CrossoverMethod::Uniform,
            CrossoverMethod::OnePoint,
            CrossoverMethod::TwoPoint,
        ] {
            let children = crossover(&pop, method, &mut rng);
            assert_eq!(children.len(), 4);
            for child in children.rows() {
                for (c, &gene) in child.iter().enumerate() {
                    let father_gene = pop.row(0)[c];
                    let mother_gene = pop.row(2)[c];
                    assert!(
                        gene == father_gene || gene == mother_gene,
                        "slot {c} gene {gene} came from neither parent"
                    );
                }
            }
        }
    }

    #[test]
    fn odd_parent_is_dropped() {
        let mut pop = Population::new(2);
        pop.push(&[1, 2]);
        pop.push(&[3, 4]);
        pop.push(&[5, 6]);
        let children = crossover(&pop, CrossoverMethod::Uniform, &mut fastrand::Rng::with_seed(1));
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn uniform_mixes_both_parents() {
        let pop = parents();
        let children = crossover(&pop, CrossoverMethod::Uniform, &mut fastrand::Rng::with_seed(42));
        let mixed = children
            .rows()
            .any(|c| c.contains(&1) && c.contains(&8) || c.contains(&5) && c.contains(&4));
        assert!(mixed, "seed 42 should mix parents across some child");
    }
}
