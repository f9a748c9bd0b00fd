use crate::reports;
use clap::Args;
use slateforge_core::config::Config;
use slateforge_core::dispatch::optimize;
use slateforge_core::error::SfResult;
use slateforge_core::optimizer::runner::{CancelToken, ProgressCallback};
use slateforge_core::pool::PlayerPool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// Player pool CSV
    #[arg(long)]
    pub csv: PathBuf,

    /// JSON config file; when set, other optimizer options are taken from it
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub config: Config,

    /// Wall-clock limit in seconds
    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    /// Write the full result object as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

struct CliLogger;

impl ProgressCallback for CliLogger {
    fn on_generation(&self, generation: usize, best_fitness: f32, n_unimproved: usize) -> bool {
        if n_unimproved == 0 || generation % 10 == 0 {
            info!("gen {generation:4} | best {best_fitness:8.2} | unimproved {n_unimproved}");
        }
        true
    }
}

pub fn run(args: OptimizeArgs) -> SfResult<i32> {
    let config = match &args.config_file {
        Some(path) => {
            info!("loading config from {}", path.display());
            Config::load_from_file(path)?
        }
        None => args.config.clone(),
    };
    config.validate()?;

    info!("loading player pool from {}", args.csv.display());
    let pool = PlayerPool::from_csv_path(&args.csv, &config.columns, config.site.pool_thresh)?;
    info!(
        "{} players across {} positions ({} rows dropped)",
        pool.len(),
        pool.position_names().len(),
        pool.dropped_rows()
    );

    let cancel = CancelToken::new();
    let max_time = args.time.map(Duration::from_secs);
    let report = optimize(&pool, &config, max_time, &cancel, &CliLogger)?;

    reports::print_result(&pool, &report);

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("result written to {}", path.display());
    }

    Ok(0)
}
