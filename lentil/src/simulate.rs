use crate::common::*;
use crate::edges::{EdgeRecord, EdgeTable};
use crate::expression::ExpressionMatrix;
use crate::segments::Segments;
use matrix_util::traits::MatWithNames;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub struct SimArgs {
    /// observations in each trajectory segment
    pub segment_lengths: Vec<usize>,
    pub num_regulators: usize,
    /// targets driven by each regulator
    pub targets_per_regulator: usize,
    /// genes with no regulator and no target
    pub num_noise_genes: usize,
    /// delay between a regulator and its targets
    pub lag: usize,
    /// autocorrelation of the latent regulator activity
    pub ar_coef: f64,
    /// standard deviation of the expression noise
    pub noise_sd: f64,
    /// probability that a value drops out to zero
    pub dropout: f64,
    pub rseed: u64,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            segment_lengths: vec![40, 40, 40],
            num_regulators: 2,
            targets_per_regulator: 2,
            num_noise_genes: 2,
            lag: 3,
            ar_coef: 0.9,
            noise_sd: 0.1,
            dropout: 0.0,
            rseed: 42,
        }
    }
}

pub struct SimOut {
    pub expression: ExpressionMatrix,
    pub segments: Segments,
    /// true `regulator -> target` edges (score 1)
    pub edges: EdgeTable,
}

impl SimOut {
    /// Pseudo-time table matching the simulated observations: one
    /// branch per segment, the position within the segment as time,
    /// `NaN` off the branch
    pub fn pseudotime(&self) -> MatWithNames<Mat> {
        let nn = self.segments.total();
        let nb = self.segments.num_segments();
        let mut mat = Mat::from_element(nn, nb, f64::NAN);
        for (b, (start, len)) in self.segments.bounds().into_iter().enumerate() {
            for t in 0..len {
                mat[(start + t, b)] = t as f64;
            }
        }
        MatWithNames {
            rows: self.expression.to_named().rows,
            cols: (1..=nb)
                .map(|b| format!("branch_{}", b).into_boxed_str())
                .collect(),
            mat,
        }
    }
}

/// AR(1) latent activity of length `len`
fn sample_latent(rng: &mut StdRng, len: usize, ar_coef: f64) -> anyhow::Result<Vec<f64>> {
    let sd = (1.0 - ar_coef * ar_coef).max(1e-4).sqrt();
    let innov = Normal::new(0.0, sd).map_err(|e| anyhow::anyhow!("innovation: {}", e))?;
    let mut ret = Vec::with_capacity(len);
    let mut z: f64 = Normal::new(0.0, 1.0)
        .map_err(|e| anyhow::anyhow!("initial state: {}", e))?
        .sample(rng);
    for _ in 0..len {
        z = ar_coef * z + innov.sample(rng);
        ret.push(z);
    }
    Ok(ret)
}

/// Simulate segment-structured expression in which each regulator
/// drives its targets `lag` steps later.
///
/// ```text
/// z_r[t]      = a z_r[t-1] + e[t]           (per segment, from t = -lag)
/// x_r[t]      = max(0, 2 + z_r[t] + noise)
/// x_target[t] = max(0, 2 + s z_r[t - lag] + noise),  s = +/-1
/// ```
///
/// Every value then drops out to 0 with probability `dropout`.
pub fn simulate_lagged_expression(args: &SimArgs) -> anyhow::Result<SimOut> {
    let segments = Segments::new(args.segment_lengths.clone())?;

    if args.num_regulators == 0 {
        return Err(anyhow::anyhow!("need at least one regulator"));
    }
    if !(args.ar_coef.abs() < 1.0) {
        return Err(anyhow::anyhow!("AR coefficient must be in (-1, 1)"));
    }
    if !(0.0..1.0).contains(&args.dropout) {
        return Err(anyhow::anyhow!("dropout must be in [0, 1)"));
    }

    let mut rng = StdRng::seed_from_u64(args.rseed);
    let noise = Normal::new(0.0, args.noise_sd).map_err(|e| anyhow::anyhow!("noise: {}", e))?;

    let nreg = args.num_regulators;
    let ntgt = nreg * args.targets_per_regulator;
    let ngenes = nreg + ntgt + args.num_noise_genes;
    let nn = segments.total();

    let mut genes: Vec<Box<str>> = Vec::with_capacity(ngenes);
    let mut edges = vec![];
    for r in 1..=nreg {
        genes.push(format!("R{}", r).into_boxed_str());
    }
    for r in 1..=nreg {
        for j in 1..=args.targets_per_regulator {
            let target = format!("T{}_{}", r, j);
            edges.push(EdgeRecord::new(&format!("R{}", r), &target, 1.0));
            genes.push(target.into_boxed_str());
        }
    }
    for j in 1..=args.num_noise_genes {
        genes.push(format!("N{}", j).into_boxed_str());
    }

    let signs: Vec<f64> = (0..ntgt)
        .map(|_| if rng.random::<f64>() < 0.5 { -1.0 } else { 1.0 })
        .collect();

    let mut mat = Mat::zeros(nn, ngenes);

    for (start, len) in segments.bounds() {
        let lag = args.lag;
        for r in 0..nreg {
            // z[t - lag] lives at index t
            let z = sample_latent(&mut rng, len + lag, args.ar_coef)?;
            for t in 0..len {
                mat[(start + t, r)] = 2.0 + z[t + lag] + noise.sample(&mut rng);
                for j in 0..args.targets_per_regulator {
                    let c = nreg + r * args.targets_per_regulator + j;
                    mat[(start + t, c)] = 2.0 + signs[c - nreg] * z[t] + noise.sample(&mut rng);
                }
            }
        }
        for c in (nreg + ntgt)..ngenes {
            let z = sample_latent(&mut rng, len, args.ar_coef)?;
            for t in 0..len {
                mat[(start + t, c)] = 2.0 + z[t] + noise.sample(&mut rng);
            }
        }
    }

    for x in mat.iter_mut() {
        *x = x.max(0.0);
        if args.dropout > 0.0 && rng.random::<f64>() < args.dropout {
            *x = 0.0;
        }
    }

    info!(
        "simulated {} observations x {} genes, {} true edges at lag {}",
        nn,
        ngenes,
        edges.len(),
        args.lag
    );

    let obs: Vec<Box<str>> = (1..=nn)
        .map(|i| format!("cell_{}", i).into_boxed_str())
        .collect();

    Ok(SimOut {
        expression: ExpressionMatrix::new(genes, obs, mat)?,
        segments,
        edges: EdgeTable::from(edges),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_and_edges() -> anyhow::Result<()> {
        let sim = simulate_lagged_expression(&SimArgs {
            dropout: 0.2,
            ..SimArgs::default()
        })?;
        assert_eq!(sim.expression.num_obs(), 120);
        assert_eq!(sim.expression.num_genes(), 8);
        assert_eq!(sim.edges.len(), 4);
        assert!(sim.expression.mat().iter().all(|&x| x >= 0.0));
        assert!(sim.expression.mat().iter().any(|&x| x == 0.0));

        let pt = sim.pseudotime();
        assert_eq!(pt.mat.ncols(), 3);
        assert_eq!(pt.mat[(41, 1)], 1.0);
        assert!(pt.mat[(41, 0)].is_nan());
        Ok(())
    }

    #[test]
    fn same_seed_same_data() -> anyhow::Result<()> {
        let a = simulate_lagged_expression(&SimArgs::default())?;
        let b = simulate_lagged_expression(&SimArgs::default())?;
        assert_eq!(a.expression.mat(), b.expression.mat());
        Ok(())
    }
}
