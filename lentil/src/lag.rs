use crate::common::*;
use crate::dcor::distance_correlation;
use crate::mutual_info::mixed_ksg_scalar;
use crate::segments::Segments;

/// Outcome of scanning candidate lags for one regulator/target pair
#[derive(Clone, Debug)]
pub struct LagSelection {
    /// chosen lag d*
    pub lag: usize,
    /// number of candidate lags scanned (`0..max_lag`)
    pub max_lag: usize,
    /// distance correlation of each candidate lag
    pub dcor: Vec<f64>,
    /// regulator history `x[t]`, concatenated over segments
    pub regulator: Vec<f64>,
    /// lagged target `y[t + d*]`, concatenated over segments
    pub target: Vec<f64>,
}

/// Index of the first maximum, ignoring NaN
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Pick the lag that maximizes distance correlation between the
/// regulator and the lag-shifted target, then align the two series
/// at that lag.
///
/// * `x` - regulator series over all observations
/// * `y` - target series over all observations
/// * `segments` - trajectory segment lengths
///
/// When the shortest segment has fewer than three observations no lag
/// can be scanned and the pair is aligned at lag 0.
pub fn select_lag(x: &[f64], y: &[f64], segments: &Segments) -> anyhow::Result<LagSelection> {
    let max_lag = segments.max_lag();

    let dcor = (0..max_lag)
        .map(|d| {
            let (xx, yy) = segments.lag_candidate(x, y, d, max_lag)?;
            distance_correlation(&xx, &yy)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let lag = argmax_first(&dcor).unwrap_or(0);
    let (regulator, target) = segments.lag_aligned(x, y, lag)?;

    Ok(LagSelection {
        lag,
        max_lag,
        dcor,
        regulator,
        target,
    })
}

/// Time-lagged mutual information I(x[t]; y[t + d*]) clipped at zero
///
/// * `x` - regulator series over all observations
/// * `y` - target series over all observations
/// * `segments` - trajectory segment lengths
/// * `knn` - number of neighbours for the MI estimator
pub fn lagged_mutual_information(
    x: &[f64],
    y: &[f64],
    segments: &Segments,
    knn: usize,
) -> anyhow::Result<(f64, LagSelection)> {
    let selection = select_lag(x, y, segments)?;
    let mi = mixed_ksg_scalar(&selection.regulator, &selection.target, knn)?;
    debug!(
        "lag {} / {} (dcor {:.4}), MI {:.4}",
        selection.lag,
        selection.max_lag,
        selection.dcor.get(selection.lag).copied().unwrap_or(f64::NAN),
        mi
    );
    Ok((mi.max(0.0), selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_the_first_tie() {
        assert_eq!(argmax_first(&[0.1, 0.7, 0.3, 0.7]), Some(1));
        assert_eq!(argmax_first(&[f64::NAN, 0.2, 0.2]), Some(1));
        assert_eq!(argmax_first(&[]), None);
        assert_eq!(argmax_first(&[f64::NAN]), None);
    }

    #[test]
    fn short_segments_fall_back_to_lag_zero() -> anyhow::Result<()> {
        let segments = Segments::new(vec![2, 10])?;
        let x: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let sel = select_lag(&x, &x, &segments)?;
        assert_eq!(sel.max_lag, 0);
        assert_eq!(sel.lag, 0);
        assert_eq!(sel.regulator.len(), 12);
        Ok(())
    }
}
