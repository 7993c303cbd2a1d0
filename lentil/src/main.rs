mod run_evaluate;
mod run_infer;
mod run_simulate;
mod run_smooth;

use run_evaluate::*;
use run_infer::*;
use run_simulate::*;
use run_smooth::*;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lentil")]
#[command(about = "Lagged ENTropy Inference of regulatory Links along pseudo-time")]
struct Cli {
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smooth, score lagged MI for every gene pair, and re-rank with mRMR
    Infer(InferArgs),
    /// Sliding-window smoothing of expression along pseudo-time branches
    Smooth(SmoothCmdArgs),
    /// AUROC, AUPRC and early precision against a reference network
    Evaluate(EvaluateArgs),
    /// Simulate expression with lagged regulator-target relations
    Simulate(SimulateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Infer(args) => {
            run_infer(args)?;
        }
        Commands::Smooth(args) => {
            run_smooth(args)?;
        }
        Commands::Evaluate(args) => {
            run_evaluate(args)?;
        }
        Commands::Simulate(args) => {
            run_simulate(args)?;
        }
    }

    Ok(())
}
