//! Mixed KSG mutual information estimator.
//!
//! For each sample the distance ρ to its k-th neighbour in the joint
//! space (L∞ norm) decides the correction:
//!
//! ```text
//! ρ_i > 0 :  ψ(k)  + ψ(N)  - ψ(n_x)  - ψ(n_y)     n_. = #{d < ρ_i}
//! ρ_i = 0 :  ln k' + ln N  - ln n_x  - ln n_y     k', n_. = #{d = 0}
//! I(X;Y) ≈ mean over samples
//! ```
//!
//! The second branch handles exact ties in the joint space, which are
//! common in zero-inflated single-cell data. Counts include the sample
//! itself.
//!
//! Gao, Kannan, Oh, Viswanath (2017). "Estimating mutual information
//! for discrete-continuous mixtures"

use crate::common::Mat;
use matrix_util::kdtree::ChebyshevKdTree;
use special::Gamma;

/// Radius treated as "the same point" and the margin that turns the
/// closed ball query into a strict `d < ρ` count
pub const TIE_RADIUS: f64 = 1e-15;

/// Estimate I(X;Y) in nats from paired samples stored as matrix rows
///
/// * `x` - `N x dx` samples of X
/// * `y` - `N x dy` samples of Y
/// * `knn` - number of neighbours, `1 <= knn <= N - 1`
///
/// The estimate can be slightly negative; callers clip it at zero.
pub fn mixed_ksg_mutual_information(x: &Mat, y: &Mat, knn: usize) -> anyhow::Result<f64> {
    if x.nrows() != y.nrows() {
        return Err(anyhow::anyhow!(
            "X has {} samples but Y has {}",
            x.nrows(),
            y.nrows()
        ));
    }
    let xx = row_major(x);
    let yy = row_major(y);
    mixed_ksg_row_major(&xx, x.ncols(), &yy, y.ncols(), knn)
}

/// Same as `mixed_ksg_mutual_information` for scalar series
pub fn mixed_ksg_scalar(x: &[f64], y: &[f64], knn: usize) -> anyhow::Result<f64> {
    if x.len() != y.len() {
        return Err(anyhow::anyhow!(
            "X has {} samples but Y has {}",
            x.len(),
            y.len()
        ));
    }
    mixed_ksg_row_major(x, 1, y, 1, knn)
}

fn row_major(data: &Mat) -> Vec<f64> {
    let mut ret = Vec::with_capacity(data.nrows() * data.ncols());
    for row in data.row_iter() {
        ret.extend(row.iter().copied());
    }
    ret
}

fn mixed_ksg_row_major(
    x: &[f64],
    dx: usize,
    y: &[f64],
    dy: usize,
    knn: usize,
) -> anyhow::Result<f64> {
    if dx == 0 || dy == 0 {
        return Err(anyhow::anyhow!("X and Y need at least one dimension"));
    }

    let nn = x.len() / dx;
    if y.len() / dy != nn {
        return Err(anyhow::anyhow!(
            "X has {} samples but Y has {}",
            nn,
            y.len() / dy
        ));
    }
    if knn == 0 {
        return Err(anyhow::anyhow!("k must be at least 1"));
    }
    if knn + 1 > nn {
        return Err(anyhow::anyhow!(
            "k = {} needs at least {} samples, got {}",
            knn,
            knn + 1,
            nn
        ));
    }

    let dj = dx + dy;
    let mut joint = Vec::with_capacity(nn * dj);
    for i in 0..nn {
        joint.extend_from_slice(&x[i * dx..(i + 1) * dx]);
        joint.extend_from_slice(&y[i * dy..(i + 1) * dy]);
    }

    let tree_x = ChebyshevKdTree::from_row_major(x.to_vec(), dx)?;
    let tree_y = ChebyshevKdTree::from_row_major(y.to_vec(), dy)?;
    let tree_xy = ChebyshevKdTree::from_row_major(joint, dj)?;

    let n_f = nn as f64;
    let psi_n = n_f.digamma();
    let psi_k = (knn as f64).digamma();
    let ln_n = n_f.ln();

    let mut accum = 0.0;
    for i in 0..nn {
        let xi = tree_x.point(i);
        let yi = tree_y.point(i);
        let zi = tree_xy.point(i);

        // the sample itself is the first neighbour
        let rho = tree_xy.kth_distance(zi, knn + 1)?;

        if rho == 0.0 {
            let kp = tree_xy.count_within(zi, TIE_RADIUS) as f64;
            let nx = tree_x.count_within(xi, TIE_RADIUS) as f64;
            let ny = tree_y.count_within(yi, TIE_RADIUS) as f64;
            accum += kp.ln() + ln_n - nx.ln() - ny.ln();
        } else {
            let radius = (rho - TIE_RADIUS).max(0.0);
            let nx = tree_x.count_within(xi, radius) as f64;
            let ny = tree_y.count_within(yi, radius) as f64;
            accum += psi_k + psi_n - nx.digamma() - ny.digamma();
        }
    }

    Ok(accum / n_f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_series_take_the_tie_branch() -> anyhow::Result<()> {
        let zeros = vec![0.0; 25];
        let mi = mixed_ksg_scalar(&zeros, &zeros, 5)?;
        assert!(mi.is_finite());
        assert_abs_diff_eq!(mi, 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn k_must_leave_a_neighbour() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(mixed_ksg_scalar(&x, &x, 9).is_ok());
        assert!(mixed_ksg_scalar(&x, &x, 10).is_err());
        assert!(mixed_ksg_scalar(&x, &x, 0).is_err());
        assert!(mixed_ksg_scalar(&x, &x[1..], 3).is_err());
    }

    #[test]
    fn matrix_and_scalar_inputs_agree() -> anyhow::Result<()> {
        let x: Vec<f64> = (0..40).map(|i| ((i * 7) % 13) as f64).collect();
        let y: Vec<f64> = (0..40).map(|i| ((i * 5) % 11) as f64 + 0.5).collect();
        let xm = Mat::from_column_slice(40, 1, &x);
        let ym = Mat::from_column_slice(40, 1, &y);
        assert_abs_diff_eq!(
            mixed_ksg_scalar(&x, &y, 3)?,
            mixed_ksg_mutual_information(&xm, &ym, 3)?
        );
        Ok(())
    }
}
