use lentil::common::*;
use lentil::smooth::{smooth_expression, SmoothArgs};

use clap::Args;
use matrix_util::common_io::{file_in_dir, mkdir, write_lines};
use matrix_util::traits::{IoOps, NamedIoOps};

#[derive(Args, Debug)]
pub struct SmoothCmdArgs {
    /// Expression table (cells x genes, CSV with a header and cell names)
    #[arg(required = true)]
    data_file: Box<str>,

    /// Pseudo-time table (cells x branches, CSV)
    #[arg(short = 't', long, required = true)]
    time_file: Box<str>,

    /// Number of cells per window
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Step between windows
    #[arg(long, default_value_t = DEFAULT_SLIDE)]
    slide: usize,

    /// Output directory
    #[arg(short, long, default_value = "./")]
    out: Box<str>,
}

pub fn run_smooth(args: &SmoothCmdArgs) -> anyhow::Result<()> {
    let expression = Mat::from_named_csv(&args.data_file)?;
    let pseudotime = Mat::from_named_csv(&args.time_file)?;

    let smoothed = smooth_expression(
        &pseudotime,
        &expression,
        &SmoothArgs {
            window_size: args.window_size,
            slide: args.slide,
        },
    )?;

    let exp_file = file_in_dir(&args.out, "smoothed.csv")?;
    let seg_file = file_in_dir(&args.out, "segments.txt")?;
    let branch_file = file_in_dir(&args.out, "branches.txt")?;
    mkdir(&exp_file)?;

    smoothed.expression.to_named().to_named_csv(&exp_file)?;
    smoothed.segments.to_file(&seg_file)?;
    write_lines(&smoothed.branches, &branch_file)?;

    info!(
        "{} observations in {} segments: {}, {}, {}",
        smoothed.expression.num_obs(),
        smoothed.segments.num_segments(),
        exp_file,
        seg_file,
        branch_file
    );
    Ok(())
}
