use lentil::common::*;
use lentil::edges::EdgeTable;
use lentil::evaluate::{read_reference_edges, EvaluationReport};

use clap::Args;
use matrix_util::common_io::mkdir;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Ranked edges (`Gene1,Gene2,score` with a header)
    #[arg(required = true)]
    edge_file: Box<str>,

    /// Reference network (header, then regulator and target columns)
    #[arg(short = 'r', long, required = true)]
    reference_file: Box<str>,

    /// Top edges for early precision (default: number of reference edges)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Density of the true network (default: reference edges over all
    /// ordered pairs of its genes)
    #[arg(long)]
    sparsity: Option<f64>,

    /// JSON report file (default: print to stdout)
    #[arg(short, long)]
    out: Option<Box<str>>,
}

pub fn run_evaluate(args: &EvaluateArgs) -> anyhow::Result<()> {
    let predicted = EdgeTable::from_csv(&args.edge_file)?;
    let reference = read_reference_edges(&args.reference_file)?;
    info!(
        "{} predicted, {} reference edges",
        predicted.len(),
        reference.len()
    );

    let report = EvaluationReport::new(&predicted, &reference, args.top_k, args.sparsity)?;

    info!(
        "AUROC {:.4}, AUPRC {:.4}, EP {:.4}, EPR {:.4}",
        report.auroc, report.auprc, report.early_precision.ep, report.early_precision.epr
    );

    match &args.out {
        Some(out) => {
            mkdir(out)?;
            report.to_json_file(out)?;
            info!("wrote {}", out);
        }
        None => println!("{}", report.to_json()?),
    }
    Ok(())
}
