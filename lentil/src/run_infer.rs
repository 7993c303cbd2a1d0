use lentil::common::*;
use lentil::expression::ExpressionMatrix;
use lentil::mrmr::{mrmr_filter, MrmrArgs, Redundancy};
use lentil::pairwise::{pairwise_mutual_information, PairwiseArgs};
use lentil::segments::Segments;
use lentil::smooth::{smooth_expression, SmoothArgs};

use clap::Args;
use matrix_util::common_io::{file_in_dir, mkdir, read_lines};
use matrix_util::traits::{IoOps, NamedIoOps};

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Expression table (cells x genes, CSV with a header and cell names)
    #[arg(required = true)]
    data_file: Box<str>,

    /// Pseudo-time table (cells x branches, CSV; empty or NA = not on
    /// the branch). The expression is smoothed along each branch.
    #[arg(short = 't', long)]
    time_file: Option<Box<str>>,

    /// Segment lengths, one per line, for an already smoothed
    /// expression table (used when no time file is given)
    #[arg(short = 's', long, conflicts_with = "time_file")]
    segment_file: Option<Box<str>>,

    /// Candidate regulators, one per line (default: every gene)
    #[arg(long)]
    tf_file: Option<Box<str>>,

    /// Number of cells per smoothing window
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Step between smoothing windows
    #[arg(long, default_value_t = DEFAULT_SLIDE)]
    slide: usize,

    /// Number of worker threads (0 = all logical CPUs)
    #[arg(short = 'j', long, default_value_t = 1)]
    n_jobs: usize,

    /// Number of neighbours of the MI estimator
    #[arg(short = 'k', long, default_value_t = DEFAULT_KNN)]
    knn: usize,

    /// Which raw MI edge counts as redundancy between a candidate and
    /// a selected regulator
    #[arg(long, value_enum, default_value = "outgoing")]
    redundancy: Redundancy,

    /// Output directory
    #[arg(short, long, default_value = "./")]
    out: Box<str>,

    /// Also write the positive raw MI edges to `rawEdges.csv`
    #[arg(long, default_value_t = false)]
    save_raw_mi: bool,

    /// Also write the smoothed expression and its segment lengths
    #[arg(long, default_value_t = false)]
    save_smoothed: bool,
}

/// Read a TF list: one identifier per line, blank lines ignored
fn read_tf_set(tf_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let tfs: Vec<Box<str>> = read_lines(tf_file)?
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(Box::from)
        .collect();
    info!("{} TFs in {}", tfs.len(), tf_file);
    Ok(tfs)
}

fn load_expression(args: &InferArgs) -> anyhow::Result<(ExpressionMatrix, Segments)> {
    let expression = Mat::from_named_csv(&args.data_file)?;
    info!(
        "read {} cells x {} genes from {}",
        expression.mat.nrows(),
        expression.mat.ncols(),
        args.data_file
    );

    match (&args.time_file, &args.segment_file) {
        (Some(time_file), _) => {
            let pseudotime = Mat::from_named_csv(time_file)?;
            let smooth_args = SmoothArgs {
                window_size: args.window_size,
                slide: args.slide,
            };
            let smoothed = smooth_expression(&pseudotime, &expression, &smooth_args)?;
            info!(
                "smoothed into {} observations over {} branches",
                smoothed.expression.num_obs(),
                smoothed.branches.len()
            );

            if args.save_smoothed {
                let exp_file = file_in_dir(&args.out, "smoothed.csv")?;
                let seg_file = file_in_dir(&args.out, "segments.txt")?;
                smoothed.expression.to_named().to_named_csv(&exp_file)?;
                smoothed.segments.to_file(&seg_file)?;
                info!("wrote {} and {}", exp_file, seg_file);
            }
            Ok((smoothed.expression, smoothed.segments))
        }
        (None, Some(segment_file)) => {
            let segments = Segments::from_file(segment_file)?;
            Ok((ExpressionMatrix::from_named(expression)?, segments))
        }
        (None, None) => Err(anyhow::anyhow!(
            "need either a time file or a segment file"
        )),
    }
}

pub fn run_infer(args: &InferArgs) -> anyhow::Result<()> {
    mkdir(&file_in_dir(&args.out, "rankedEdges.csv")?)?;

    let (expression, segments) = load_expression(args)?;

    let tf_set = match &args.tf_file {
        Some(tf_file) => read_tf_set(tf_file)?,
        None => vec![],
    };

    let pairwise_args = PairwiseArgs {
        n_jobs: args.n_jobs,
        knn: args.knn,
        tf_set,
    };

    let raw = pairwise_mutual_information(&expression, &segments, &pairwise_args)?.into_ranked();
    info!("{} edges with positive MI", raw.len());

    if args.save_raw_mi {
        let raw_file = file_in_dir(&args.out, "rawEdges.csv")?;
        raw.to_csv(&raw_file)?;
        info!("wrote raw MI edges to {}", raw_file);
    }

    let mrmr_args = MrmrArgs {
        n_jobs: args.n_jobs,
        redundancy: args.redundancy,
    };

    let ranked = mrmr_filter(&raw, &mrmr_args)?.into_ranked();

    let ranked_file = file_in_dir(&args.out, "rankedEdges.csv")?;
    ranked.to_csv(&ranked_file)?;
    info!("wrote {} ranked edges to {}", ranked.len(), ranked_file);

    Ok(())
}
