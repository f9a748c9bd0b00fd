pub mod crossover;
pub mod fitness;
pub mod mutate;
pub mod runner;
pub mod sampler;

pub use self::mutate::MutationIntensity;
pub use self::runner::{SetOptimizer, SetOptimizerOptions, SetOutcome};
