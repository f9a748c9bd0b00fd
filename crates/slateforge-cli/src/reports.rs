use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use slateforge_core::dispatch::OptimizationReport;
use slateforge_core::pool::PlayerPool;
use slateforge_core::types::Lineup;
use tracing::info;

pub fn print_pool_summary(pool: &PlayerPool) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Position", "Players"]);
    for (name, count) in pool.position_counts() {
        table.add_row(vec![name, count.to_string()]);
    }
    println!("{table}");
    info!(
        "{} usable players ({} rows dropped at ingest)",
        pool.len(),
        pool.dropped_rows()
    );
}

fn lineup_table(pool: &PlayerPool, lineup: &Lineup) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Player", "Pos", "Salary", "Proj"]);
    let mut salary = 0u32;
    let mut proj = 0.0f32;
    for &id in lineup {
        let player = pool.player(id);
        salary += player.salary;
        proj += player.points;
        table.add_row(vec![
            player.name.clone(),
            pool.position_name(player.pos).to_string(),
            player.salary.to_string(),
            format!("{:.1}", player.points),
        ]);
    }
    table.add_row(vec![
        "TOTAL".to_string(),
        String::new(),
        salary.to_string(),
        format!("{proj:.1}"),
    ]);
    table
}

pub fn print_result(pool: &PlayerPool, report: &OptimizationReport) {
    println!("\n=== Best lineup ({:.2} pts) ===", report.best_score);
    println!("{}", lineup_table(pool, &report.best_lineup));

    if let (Some(lineups), Some(scores)) = (&report.lineups, &report.scores) {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["#", "Proj", "Salary", "Players"]);
        for (i, (lineup, score)) in lineups.iter().zip(scores).enumerate() {
            let salary: u32 = lineup.iter().map(|&id| pool.player(id).salary).sum();
            let names = lineup
                .iter()
                .map(|&id| pool.player(id).name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                (i + 1).to_string(),
                format!("{score:.1}"),
                salary.to_string(),
                names,
            ]);
        }
        println!("\n=== {} lineups ===", lineups.len());
        println!("{table}");
    }

    if let Some(metrics) = &report.diversity_metrics {
        info!(
            "diversity: avg overlap {:.3}, min overlap {:.3}{}{}",
            metrics.avg_overlap,
            metrics.min_overlap,
            if metrics.relaxed { " (relaxed)" } else { "" },
            if metrics.shortfall { " (shortfall)" } else { "" },
        );
    }

    if let Some(exposure) = &report.exposure {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Player", "Lineups"]);
        for (id, count) in exposure.iter().take(10) {
            table.add_row(vec![pool.player(*id).name.clone(), count.to_string()]);
        }
        println!("\n=== Exposure (top 10) ===");
        println!("{table}");
    }

    if let Some(profiling) = &report.profiling {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Operation", "Total (s)", "Count", "Avg (s)", "Max (s)"]);
        for (name, op) in &profiling.operations {
            table.add_row(vec![
                name.clone(),
                format!("{:.4}", op.total),
                op.count.to_string(),
                format!("{:.5}", op.avg),
                format!("{:.5}", op.max),
            ]);
        }
        println!("\n=== Profiling ===");
        println!(
            "total {:.3}s (setup {:.3}s, loop {:.3}s), best at gen {} after {:.3}s",
            profiling.total_time,
            profiling.setup_time,
            profiling.loop_time,
            profiling.best_solution_generation,
            profiling.time_to_best_solution
        );
        println!("{table}");
    }

    if report.aborted {
        info!("run aborted (cancellation or time limit); returning best so far");
    }
    if report.stagnated {
        info!(
            "stopped early after stagnation; best found at generation {}",
            report.best_solution_generation
        );
    }
}
