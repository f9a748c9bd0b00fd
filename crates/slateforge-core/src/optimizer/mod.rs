pub mod crossover;
pub mod fitness;
pub mod mutate;
pub mod populate;
pub mod postselect;
pub mod runner;
pub mod select;
pub mod validate;

pub use self::runner::{CancelToken, GaOutcome, Optimizer, OptimizerOptions, ProgressCallback};
pub use self::validate::Validator;
