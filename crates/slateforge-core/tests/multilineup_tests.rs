mod common;

use common::{slate_config, slate_pool, tiny_config, tiny_pool};
use slateforge_core::dispatch::optimize;
use slateforge_core::optimizer::runner::{CancelToken, NoProgress};
use std::collections::HashSet;

#[test]
fn post_processing_returns_target_diverse_lineups() {
    let pool = slate_pool();
    let mut config = slate_config(21);
    config.ga.population_size = 600;
    config.ga.target_lineups = 5;
    config.ga.mode = "post_processing".to_string();
    config.ga.diversity_weight = 0.3;
    config.ga.min_overlap_threshold = 0.3;

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    let lineups = report.lineups.expect("multilineup result");
    let scores = report.scores.expect("multilineup scores");
    assert_eq!(lineups.len(), 5);
    assert_eq!(scores.len(), 5);

    // the first selected lineup is the single-lineup winner
    assert_eq!(scores[0], report.best_score);

    let metrics = report.diversity_metrics.expect("diversity metrics");
    if !metrics.relaxed {
        for i in 0..lineups.len() {
            for j in (i + 1)..lineups.len() {
                assert!(
                    metrics.pairwise_matrix[i][j] <= 0.7 + 1e-5,
                    "pairwise jaccard {} exceeds bound without relaxation",
                    metrics.pairwise_matrix[i][j]
                );
            }
        }
    }

    assert!(report.exposure.is_some());
}

#[test]
fn post_processing_shortfall_on_exhausted_pool() {
    // tiny pool admits only 6 distinct lineups; asking for 10 must return
    // everything available with the shortfall flag rather than failing
    let pool = tiny_pool();
    let mut config = tiny_config(3);
    config.ga.target_lineups = 10;
    config.ga.mode = "post_processing".to_string();

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    let lineups = report.lineups.unwrap();
    assert!(lineups.len() <= 6);
    assert!(report.diversity_metrics.unwrap().shortfall);
}

#[test]
fn set_based_returns_exactly_target_lineups() {
    let pool = slate_pool();
    let mut config = slate_config(1);
    config.ga.target_lineups = 5;
    config.ga.population_size = 30;
    config.ga.lineup_pool_size = 2000;
    config.ga.n_generations = 5;

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    let lineups = report.lineups.expect("set-based lineups");
    let scores = report.scores.expect("set-based scores");
    assert_eq!(lineups.len(), 5);

    // scores are presented best-first
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }

    // every lineup in the winning set is individually valid
    let flex_slot = 8;
    for lineup in &lineups {
        let salary: u32 = lineup.iter().map(|&id| pool.player(id).salary).sum();
        assert!(salary <= config.site.salary_cap);
        let unique: HashSet<_> = lineup.iter().collect();
        assert_eq!(unique.len(), lineup.len());
        let flex_pos = pool.position_name(pool.player(lineup[flex_slot]).pos);
        assert!(matches!(flex_pos, "RB" | "WR" | "TE"));
    }

    // and pairwise distinct as player sets
    let mut keys: Vec<Vec<u32>> = lineups
        .iter()
        .map(|l| {
            let mut k = l.clone();
            k.sort_unstable();
            k
        })
        .collect();
    keys.sort();
    let before = keys.len();
    keys.dedup();
    assert_eq!(keys.len(), before, "winning set repeats a lineup");

    let metrics = report.diversity_metrics.unwrap();
    assert!(metrics.avg_overlap < 1.0);
}

#[test]
fn single_target_ignores_multilineup_mode() {
    let pool = slate_pool();
    let mut config = slate_config(2);
    config.ga.target_lineups = 1;
    config.ga.mode = "set_based".to_string();

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    assert!(report.lineups.is_none());
    assert!(report.scores.is_none());
    assert!(report.diversity_metrics.is_none());
}

#[test]
fn set_based_diversity_weight_zero_still_returns_distinct_lineups() {
    let pool = slate_pool();
    let mut config = slate_config(4);
    config.ga.target_lineups = 3;
    config.ga.population_size = 15;
    config.ga.lineup_pool_size = 800;
    config.ga.n_generations = 3;
    config.ga.diversity_weight = 0.0;

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    let lineups = report.lineups.unwrap();
    assert_eq!(lineups.len(), 3);

    let mut keys: Vec<Vec<u32>> = lineups
        .iter()
        .map(|l| {
            let mut k = l.clone();
            k.sort_unstable();
            k
        })
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 3);
}

#[test]
fn hamming_method_works_end_to_end() {
    let pool = slate_pool();
    let mut config = slate_config(6);
    config.ga.target_lineups = 3;
    config.ga.mode = "post_processing".to_string();
    config.ga.diversity_method = "hamming".to_string();

    let report = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(report.lineups.unwrap().len(), 3);
}
