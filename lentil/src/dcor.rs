//! Distance correlation (Székely, Rizzo, Bakirov 2007) of two scalar
//! series, in [0, 1].
//!
//! ```text
//! A_ij = |x_i - x_j| - mean_i - mean_j + grand mean   (same for B)
//! dCor² = mean(A∘B) / sqrt(mean(A∘A) mean(B∘B))
//! ```
//!
//! The double-centred matrices are never stored: row means come first
//! and the products are accumulated in a second pass.

/// Distance correlation of `x` and `y`; a constant series has zero
/// distance variance and gives 0
pub fn distance_correlation(x: &[f64], y: &[f64]) -> anyhow::Result<f64> {
    let nn = x.len();
    if nn != y.len() {
        return Err(anyhow::anyhow!(
            "series lengths differ: {} vs {}",
            nn,
            y.len()
        ));
    }
    if nn == 0 {
        return Err(anyhow::anyhow!("empty series"));
    }

    let row_mean_x = row_mean_distances(x);
    let row_mean_y = row_mean_distances(y);
    let grand_x = row_mean_x.iter().sum::<f64>() / nn as f64;
    let grand_y = row_mean_y.iter().sum::<f64>() / nn as f64;

    let mut dcov = 0.0;
    let mut dvar_x = 0.0;
    let mut dvar_y = 0.0;

    for i in 0..nn {
        for j in 0..nn {
            let a = (x[i] - x[j]).abs() - row_mean_x[i] - row_mean_x[j] + grand_x;
            let b = (y[i] - y[j]).abs() - row_mean_y[i] - row_mean_y[j] + grand_y;
            dcov += a * b;
            dvar_x += a * a;
            dvar_y += b * b;
        }
    }

    let denom = (dvar_x * dvar_y).sqrt();
    if !(denom > 0.0) {
        return Ok(0.0);
    }

    let dcor_sq = (dcov / denom).clamp(0.0, 1.0);
    Ok(dcor_sq.sqrt())
}

/// mean_j |v_i - v_j| for every i, by sorting and prefix sums
fn row_mean_distances(v: &[f64]) -> Vec<f64> {
    let nn = v.len();
    let mut order: Vec<usize> = (0..nn).collect();
    order.sort_by(|&a, &b| v[a].total_cmp(&v[b]));

    let total: f64 = v.iter().sum();
    let mut ret = vec![0.0; nn];
    let mut below = 0.0;

    for (rank, &i) in order.iter().enumerate() {
        let vi = v[i];
        let above = total - below - vi;
        let n_below = rank as f64;
        let n_above = (nn - rank - 1) as f64;
        ret[i] = (vi * n_below - below + above - vi * n_above) / nn as f64;
        below += vi;
    }
    ret
}
