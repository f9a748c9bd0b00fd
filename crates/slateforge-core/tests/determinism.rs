mod common;

use common::{slate_config, slate_pool};
use slateforge_core::dispatch::optimize;
use slateforge_core::optimizer::runner::{CancelToken, NoProgress};

#[test]
fn identical_seeds_reproduce_the_run_exactly() {
    let pool = slate_pool();
    let config = slate_config(7);

    let a = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    let b = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    assert_eq!(a.best_lineup, b.best_lineup);
    assert_eq!(a.best_score, b.best_score);
    assert_eq!(a.fitness, b.fitness);
    assert_eq!(a.population, b.population);
    assert_eq!(a.best_solution_generation, b.best_solution_generation);
}

#[test]
fn different_seeds_usually_diverge() {
    let pool = slate_pool();

    let a = optimize(&pool, &slate_config(1), None, &CancelToken::new(), &NoProgress).unwrap();
    let b = optimize(&pool, &slate_config(2), None, &CancelToken::new(), &NoProgress).unwrap();

    // the best lineup may coincide, but two full populations matching on
    // different seeds would mean the RNG is not actually driving the search
    assert_ne!(a.population, b.population);
}

#[test]
fn set_based_runs_reproduce_bit_identically() {
    let pool = slate_pool();
    let mut config = slate_config(9);
    config.ga.target_lineups = 4;
    config.ga.population_size = 20;
    config.ga.lineup_pool_size = 500;
    config.ga.n_generations = 4;

    let a = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    let b = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    assert_eq!(a.lineups, b.lineups);
    assert_eq!(a.scores, b.scores);
}

#[test]
fn post_processing_runs_reproduce_bit_identically() {
    let pool = slate_pool();
    let mut config = slate_config(13);
    config.ga.target_lineups = 4;
    config.ga.mode = "post_processing".to_string();

    let a = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();
    let b = optimize(&pool, &config, None, &CancelToken::new(), &NoProgress).unwrap();

    assert_eq!(a.lineups, b.lineups);
    assert_eq!(a.scores, b.scores);
}
