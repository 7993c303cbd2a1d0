//! Sliding-window smoothing of cells along pseudo-time.
//!
//! Each branch (a pseudo-time column) becomes one trajectory segment:
//! its cells are ordered by pseudo-time and every window of
//! `window_size` consecutive cells is summarized into one observation.

use crate::common::*;
use crate::expression::ExpressionMatrix;
use crate::segments::Segments;
use matrix_util::dmatrix_util::concatenate_vertical;
use matrix_util::traits::MatWithNames;

#[derive(Clone, Debug)]
pub struct SmoothArgs {
    /// number of cells per window
    pub window_size: usize,
    /// step between window starts
    pub slide: usize,
}

impl Default for SmoothArgs {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            slide: DEFAULT_SLIDE,
        }
    }
}

pub struct SmoothedData {
    pub expression: ExpressionMatrix,
    pub segments: Segments,
    /// branches that produced a segment, in segment order
    pub branches: Vec<Box<str>>,
}

/// `[lb, ub)` cell ranges of the windows over `n` ordered cells
///
/// Windows start at 0 and move by `slide` while a full window fits
/// strictly inside; the last window always covers the tail
/// `[n - window_size, n)`, clamped at 0.
pub fn window_bounds(n: usize, window_size: usize, slide: usize) -> Vec<(usize, usize)> {
    let mut ret = vec![];
    if n == 0 {
        return ret;
    }
    let mut start = 0;
    while start + window_size < n {
        ret.push((start, start + window_size));
        start += slide;
    }
    ret.push((n.saturating_sub(window_size), n));
    ret
}

/// Summarize one window of a gene: 0 if at least half of the values
/// are exact zeros, the mean otherwise
pub fn summarize_window(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let nn = values.len() as f64;
    let nzero = values.iter().filter(|&&x| x == 0.0).count() as f64;
    if nzero >= nn / 2.0 {
        0.0
    } else {
        values.iter().sum::<f64>() / nn
    }
}

/// Cells of a branch ordered by pseudo-time, as row indexes of the
/// expression table. Cells with missing pseudo-time or no expression
/// row are left out; equal times keep their input order.
fn order_branch_cells(
    times: &[f64],
    cells: &[Box<str>],
    expr_row: &HashMap<&str, usize>,
) -> Vec<usize> {
    let mut timed: Vec<(f64, usize)> = times
        .iter()
        .zip(cells.iter())
        .filter(|(t, _)| t.is_finite())
        .filter_map(|(&t, c)| expr_row.get(c.as_ref()).map(|&r| (t, r)))
        .collect();
    timed.sort_by(|a, b| a.0.total_cmp(&b.0));
    timed.into_iter().map(|(_, r)| r).collect()
}

/// Smooth the expression of each pseudo-time branch with sliding
/// windows and stack the branches into one expression matrix.
///
/// * `pseudotime` - cells x branches; `NaN` = cell not on the branch
/// * `expression` - cells x genes
/// * `args` - window size and slide
///
/// Output rows are named `{branch}_{j}` (windows numbered from 1).
pub fn smooth_expression(
    pseudotime: &MatWithNames<Mat>,
    expression: &MatWithNames<Mat>,
    args: &SmoothArgs,
) -> anyhow::Result<SmoothedData> {
    if args.window_size == 0 {
        return Err(anyhow::anyhow!("window size must be at least 1"));
    }
    if args.slide == 0 {
        return Err(anyhow::anyhow!("slide must be at least 1"));
    }
    if pseudotime.rows.len() != pseudotime.mat.nrows() {
        return Err(anyhow::anyhow!(
            "{} cell names for {} pseudo-time rows",
            pseudotime.rows.len(),
            pseudotime.mat.nrows()
        ));
    }
    if expression.rows.len() != expression.mat.nrows() {
        return Err(anyhow::anyhow!(
            "{} cell names for {} expression rows",
            expression.rows.len(),
            expression.mat.nrows()
        ));
    }

    let mut expr_row: HashMap<&str, usize> = HashMap::new();
    for (r, c) in expression.rows.iter().enumerate() {
        expr_row.entry(c.as_ref()).or_insert(r);
    }

    let ngenes = expression.mat.ncols();
    let mut blocks = vec![];
    let mut lengths = vec![];
    let mut branches = vec![];
    let mut obs = vec![];

    for (b, branch) in pseudotime.cols.iter().enumerate() {
        let times: Vec<f64> = pseudotime.mat.column(b).iter().copied().collect();
        let cells = order_branch_cells(&times, &pseudotime.rows, &expr_row);

        if cells.is_empty() {
            warn!("branch {} has no cells with expression; skipped", branch);
            continue;
        }

        let windows = window_bounds(cells.len(), args.window_size, args.slide);
        let mut block = Mat::zeros(windows.len(), ngenes);
        let mut buf = Vec::with_capacity(args.window_size);

        for (w, &(lb, ub)) in windows.iter().enumerate() {
            for g in 0..ngenes {
                buf.clear();
                buf.extend(cells[lb..ub].iter().map(|&r| expression.mat[(r, g)]));
                block[(w, g)] = summarize_window(&buf);
            }
            obs.push(format!("{}_{}", branch, w + 1).into_boxed_str());
        }

        info!(
            "branch {}: {} cells -> {} windows",
            branch,
            cells.len(),
            windows.len()
        );

        lengths.push(windows.len());
        branches.push(branch.clone());
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(anyhow::anyhow!("no branch shares cells with the expression table"));
    }

    let mat = concatenate_vertical(&blocks)?;
    let expression = ExpressionMatrix::new(expression.cols.clone(), obs, mat)?;
    let segments = Segments::new(lengths)?;

    Ok(SmoothedData {
        expression,
        segments,
        branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn names(prefix: &str, n: usize) -> Vec<Box<str>> {
        (0..n).map(|i| format!("{}{}", prefix, i).into_boxed_str()).collect()
    }

    #[test]
    fn windows_end_with_the_tail() {
        assert_eq!(window_bounds(7, 5, 1), vec![(0, 5), (1, 6), (2, 7)]);
        assert_eq!(window_bounds(10, 3, 4), vec![(0, 3), (4, 7), (7, 10)]);
        assert_eq!(window_bounds(5, 5, 1), vec![(0, 5)]);
        assert_eq!(window_bounds(3, 5, 1), vec![(0, 3)]);
        assert!(window_bounds(0, 5, 1).is_empty());
    }

    #[test]
    fn zero_heavy_windows_collapse() {
        assert_eq!(summarize_window(&[0.0, 0.0, 3.0, 5.0]), 0.0);
        assert_abs_diff_eq!(summarize_window(&[0.0, 2.0, 4.0]), 2.0);
        assert_abs_diff_eq!(summarize_window(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
    }

    #[test]
    fn branches_become_segments() -> anyhow::Result<()> {
        // cells c0..c5; branch p0 holds c0..c5 in reverse time order,
        // branch p1 only c4, c5, branch p2 no cells
        let cells = names("c", 6);
        let nan = f64::NAN;
        let times = Mat::from_row_slice(
            6,
            3,
            &[
                5., nan, nan, //
                4., nan, nan, //
                3., nan, nan, //
                2., nan, nan, //
                1., 0.2, nan, //
                0., 0.1, nan,
            ],
        );
        let pseudotime = MatWithNames {
            rows: cells.clone(),
            cols: vec!["p0".into(), "p1".into(), "p2".into()],
            mat: times,
        };
        let expr = Mat::from_row_slice(6, 1, &[6., 5., 4., 3., 2., 1.]);
        let expression = MatWithNames {
            rows: cells,
            cols: vec!["g".into()],
            mat: expr,
        };

        let args = SmoothArgs {
            window_size: 3,
            slide: 1,
        };
        let out = smooth_expression(&pseudotime, &expression, &args)?;

        // p0 ordered: 1..6 -> windows [0,3), [1,4), [2,5), [3,6)
        // p1 ordered: c5 (1), c4 (2) -> single window
        assert_eq!(out.segments.lengths(), &[4, 1]);
        let branches: Vec<&str> = out.branches.iter().map(|b| b.as_ref()).collect();
        assert_eq!(branches, vec!["p0", "p1"]);

        let g = out.expression.gene_series(0);
        assert_abs_diff_eq!(g[0], 2.0);
        assert_abs_diff_eq!(g[3], 5.0);
        assert_abs_diff_eq!(g[4], 1.5);
        assert_eq!(out.expression.to_named().rows[4].as_ref(), "p1_1");
        Ok(())
    }
}
