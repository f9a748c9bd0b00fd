use clap::{Parser, Subcommand};
use std::process;
use tracing::error;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(
    name = "slateforge",
    version,
    about = "Genetic-algorithm lineup optimizer for daily fantasy slates",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the optimizer against a player pool CSV
    Optimize(cmd::optimize::OptimizeArgs),
    /// Check a player pool for feasibility under the configured slots and cap
    Validate(cmd::validate::ValidateArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Optimize(args) => cmd::optimize::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
