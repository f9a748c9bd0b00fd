use crate::reports;
use clap::Args;
use slateforge_core::config::Config;
use slateforge_core::error::SfResult;
use slateforge_core::layout::SlotLayout;
use slateforge_core::pool::PlayerPool;
use slateforge_core::pospool::PositionPool;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Player pool CSV
    #[arg(long)]
    pub csv: PathBuf,

    #[command(flatten)]
    pub config: Config,
}

pub fn run(args: ValidateArgs) -> SfResult<i32> {
    let config = args.config;
    config.validate()?;

    let pool = PlayerPool::from_csv_path(&args.csv, &config.columns, config.site.pool_thresh)?;
    reports::print_pool_summary(&pool);

    let posmap = config.site.parsed_posmap()?;
    let posfilter = config.site.parsed_posfilter()?;
    let flex_positions = config.site.parsed_flex_positions();

    // errors here mean the pool cannot fill the slots at all
    let pospool = PositionPool::build(&pool, &posmap, &posfilter, &flex_positions)?;
    let layout = SlotLayout::build(&posmap);

    // lower bound on roster cost: the cheapest fill of each position group
    // independently (ignores cross-group player overlap)
    let mut min_salary: u64 = 0;
    for &(view_idx, count) in layout.groups() {
        let mut salaries = pospool.view(view_idx).salaries.clone();
        salaries.sort_unstable();
        min_salary += salaries.iter().take(count).map(|&s| s as u64).sum::<u64>();
    }

    if min_salary > config.site.salary_cap as u64 {
        error!(
            "infeasible: cheapest possible roster costs at least {} against cap {}",
            min_salary, config.site.salary_cap
        );
        return Ok(1);
    }

    info!(
        "feasible: cheapest roster lower bound {} under cap {} ({} slots)",
        min_salary,
        config.site.salary_cap,
        layout.len()
    );
    Ok(0)
}
