pub mod config;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod optimizer;
pub mod pool;
pub mod pospool;
pub mod postprocess;
pub mod profiler;
pub mod sets;
pub mod similarity;
pub mod types;

pub use config::Config;
pub use dispatch::{optimize, OptimizationReport, OptimizeMode};
pub use error::{SfResult, SlateForgeError};
pub use optimizer::{CancelToken, ProgressCallback};
