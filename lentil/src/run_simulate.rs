use lentil::common::*;
use lentil::simulate::{simulate_lagged_expression, SimArgs};

use clap::Args;
use matrix_util::common_io::{file_in_dir, mkdir, write_lines};
use matrix_util::traits::NamedIoOps;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Observations in each trajectory segment
    #[arg(short = 'n', long, value_delimiter = ',', default_values_t = vec![40, 40, 40])]
    segment_lengths: Vec<usize>,

    /// Number of regulators
    #[arg(short = 'r', long, default_value_t = 2)]
    num_regulators: usize,

    /// Targets driven by each regulator
    #[arg(long, default_value_t = 2)]
    targets_per_regulator: usize,

    /// Genes with no edges
    #[arg(long, default_value_t = 2)]
    num_noise_genes: usize,

    /// Delay between a regulator and its targets
    #[arg(short = 'l', long, default_value_t = 3)]
    lag: usize,

    /// Autocorrelation of regulator activity
    #[arg(long, default_value_t = 0.9)]
    ar_coef: f64,

    /// Standard deviation of expression noise
    #[arg(long, default_value_t = 0.1)]
    noise_sd: f64,

    /// Probability of a dropout zero
    #[arg(long, default_value_t = 0.0)]
    dropout: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    rseed: u64,

    /// Output directory
    #[arg(short, long, required = true)]
    out: Box<str>,
}

pub fn run_simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let sim = simulate_lagged_expression(&SimArgs {
        segment_lengths: args.segment_lengths.clone(),
        num_regulators: args.num_regulators,
        targets_per_regulator: args.targets_per_regulator,
        num_noise_genes: args.num_noise_genes,
        lag: args.lag,
        ar_coef: args.ar_coef,
        noise_sd: args.noise_sd,
        dropout: args.dropout,
        rseed: args.rseed,
    })?;

    let exp_file = file_in_dir(&args.out, "expression.csv")?;
    let time_file = file_in_dir(&args.out, "pseudotime.csv")?;
    let seg_file = file_in_dir(&args.out, "segments.txt")?;
    let ref_file = file_in_dir(&args.out, "refNetwork.csv")?;
    mkdir(&exp_file)?;

    sim.expression.to_named().to_named_csv(&exp_file)?;
    sim.pseudotime().to_named_csv(&time_file)?;
    sim.segments.to_file(&seg_file)?;

    let mut lines: Vec<Box<str>> = vec!["Gene1,Gene2".into()];
    lines.extend(
        sim.edges
            .iter()
            .map(|e| format!("{},{}", e.regulator, e.target).into_boxed_str()),
    );
    write_lines(&lines, &ref_file)?;

    info!(
        "wrote {}, {}, {}, {}",
        exp_file, time_file, seg_file, ref_file
    );
    Ok(())
}
