use crate::traits::SampleOps;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;

impl SampleOps for DMatrix<f64> {
    type Mat = Self;
    type Scalar = f64;

    /// Sample d,n matrix from U(0,1)
    fn runif(dd: usize, nn: usize) -> Self::Mat {
        let rvec = (0..(dd * nn))
            .into_par_iter()
            .map_init(rand::rng, |rng, _| rng.random::<f64>())
            .collect();
        DMatrix::<f64>::from_vec(dd, nn, rvec)
    }

    /// Sample d,n matrix from N(0,1)
    fn rnorm(dd: usize, nn: usize) -> Self::Mat {
        let rvec = (0..(dd * nn))
            .into_par_iter()
            .map_init(rand::rng, |rng, _| rng.sample::<f64, _>(StandardNormal))
            .collect();
        DMatrix::<f64>::from_vec(dd, nn, rvec)
    }

    fn runif_seeded(dd: usize, nn: usize, seed: u64) -> Self::Mat {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::<f64>::from_fn(dd, nn, |_, _| rng.random::<f64>())
    }

    fn rnorm_seeded(dd: usize, nn: usize, seed: u64) -> Self::Mat {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::<f64>::from_fn(dd, nn, |_, _| rng.sample::<f64, _>(StandardNormal))
    }
}

/// Concatenate matrices vertically (row-wise stacking)
pub fn concatenate_vertical(blocks: &[DMatrix<f64>]) -> anyhow::Result<DMatrix<f64>> {
    let ncols = blocks.first().map(|b| b.ncols()).unwrap_or(0);
    if blocks.iter().any(|b| b.ncols() != ncols) {
        return Err(anyhow::anyhow!("blocks have different numbers of columns"));
    }
    let nrows = blocks.iter().map(|b| b.nrows()).sum::<usize>();
    let mut ret = DMatrix::<f64>::zeros(nrows, ncols);
    let mut lb = 0;
    for b in blocks {
        ret.rows_mut(lb, b.nrows()).copy_from(b);
        lb += b.nrows();
    }
    Ok(ret)
}
