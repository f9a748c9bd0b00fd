#![allow(dead_code)]

use slateforge_core::config::Config;
use slateforge_core::pool::{PlayerPool, PlayerRow};

pub fn row(name: &str, pos: &str, salary: u32, points: f32) -> PlayerRow {
    PlayerRow {
        name: name.to_string(),
        team: None,
        position: pos.to_string(),
        salary,
        points,
    }
}

/// A full classic slate with enough depth at every position for the
/// default posmap. Salaries and projections are deterministic functions of
/// the index so fixtures never drift.
pub fn slate_pool() -> PlayerPool {
    let mut rows = Vec::new();
    let specs = [("QB", 8), ("RB", 12), ("WR", 14), ("TE", 8), ("DST", 6)];
    for (pos, n) in specs {
        for i in 0..n {
            let salary = 3000 + ((i * 457) % 4500) as u32;
            let points = salary as f32 / 400.0 + ((i * 7) % 5) as f32;
            rows.push(row(&format!("{pos}{i}"), pos, salary, points));
        }
    }
    PlayerPool::from_rows(rows, 0.0).unwrap()
}

/// A pool so small the optimum is certain: each slot group has barely more
/// players than slots, and every lineup fits the cap.
pub fn tiny_pool() -> PlayerPool {
    PlayerPool::from_rows(
        vec![
            row("q1", "QB", 5000, 20.0),
            row("q2", "QB", 5000, 10.0),
            row("r1", "RB", 4000, 15.0),
            row("r2", "RB", 4000, 12.0),
            row("r3", "RB", 4000, 8.0),
        ],
        0.0,
    )
    .unwrap()
}

/// Config matching `tiny_pool`: one QB, two RBs, no FLEX, roomy cap.
pub fn tiny_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.ga.population_size = 100;
    config.ga.n_generations = 10;
    config.ga.stop_criteria = 10;
    config.ga.seed = Some(seed);
    config.site.posmap = "QB:1,RB:2".to_string();
    config.site.flex_positions = String::new();
    config.site.posfilter = String::new();
    config.site.salary_cap = 50_000;
    config.site.pool_thresh = 0.0;
    config
}

/// Config matching `slate_pool` with small loop sizes for fast tests.
pub fn slate_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.ga.population_size = 300;
    config.ga.n_generations = 8;
    config.ga.stop_criteria = 8;
    config.ga.seed = Some(seed);
    config.site.posfilter = String::new();
    config.site.pool_thresh = 0.0;
    config
}
