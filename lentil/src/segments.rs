//! Trajectory segments and lag alignment.
//!
//! Observations of every trajectory (branch) are stored back to back.
//! A lag never reaches across a segment boundary: each segment is
//! shifted on its own and the aligned pieces are concatenated again.

use matrix_util::common_io::{read_lines, write_types};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segments {
    lengths: Vec<usize>,
}

impl Segments {
    /// * `lengths` - number of observations in each segment, in row order
    pub fn new(lengths: Vec<usize>) -> anyhow::Result<Self> {
        if lengths.is_empty() {
            return Err(anyhow::anyhow!("empty segment length list"));
        }
        if let Some(k) = lengths.iter().position(|&l| l == 0) {
            return Err(anyhow::anyhow!("segment {} has no observations", k));
        }
        Ok(Self { lengths })
    }

    /// Read one positive integer per line
    pub fn from_file(file: &str) -> anyhow::Result<Self> {
        let lengths = read_lines(file)?
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("{}: bad segment length '{}': {}", file, l, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Self::new(lengths)
    }

    pub fn to_file(&self, file: &str) -> anyhow::Result<()> {
        write_types(&self.lengths, file)
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn num_segments(&self) -> usize {
        self.lengths.len()
    }

    /// Total number of observations
    pub fn total(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Fail unless the segments exactly cover `nrows` observations
    pub fn check_rows(&self, nrows: usize) -> anyhow::Result<()> {
        if self.total() != nrows {
            return Err(anyhow::anyhow!(
                "segment lengths sum to {}, but there are {} observations",
                self.total(),
                nrows
            ));
        }
        Ok(())
    }

    /// Candidate lags are `0..max_lag` with `max_lag = floor(min length / 3)`
    pub fn max_lag(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0) / 3
    }

    /// `(start, length)` of each segment
    pub fn bounds(&self) -> Vec<(usize, usize)> {
        let mut start = 0;
        self.lengths
            .iter()
            .map(|&len| {
                let ret = (start, len);
                start += len;
                ret
            })
            .collect()
    }

    /// Number of aligned pairs produced by `lag_candidate`, the same
    /// for every candidate lag
    pub fn candidate_length(&self, max_lag: usize) -> usize {
        self.lengths.iter().map(|&l| l.saturating_sub(max_lag)).sum()
    }

    /// Pairs `(x[t], y[t + lag])` within each segment, keeping
    /// `len - max_lag` pairs per segment no matter what `lag` is, so
    /// that every candidate lag is scored on equally many points.
    ///
    /// * `x` - regulator series over all observations
    /// * `y` - target series over all observations
    /// * `lag` - candidate lag, `lag < max_lag`
    /// * `max_lag` - number of points trimmed from each segment
    pub fn lag_candidate(
        &self,
        x: &[f64],
        y: &[f64],
        lag: usize,
        max_lag: usize,
    ) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
        self.check_series(x, y)?;
        if lag >= max_lag {
            return Err(anyhow::anyhow!(
                "candidate lag {} is out of range [0, {})",
                lag,
                max_lag
            ));
        }
        if max_lag > self.lengths.iter().copied().min().unwrap_or(0) {
            return Err(anyhow::anyhow!(
                "maximum lag {} exceeds the shortest segment",
                max_lag
            ));
        }

        let ntot = self.candidate_length(max_lag);
        let mut xx = Vec::with_capacity(ntot);
        let mut yy = Vec::with_capacity(ntot);

        for (start, len) in self.bounds() {
            let keep = len - max_lag;
            xx.extend_from_slice(&x[start..start + keep]);
            yy.extend_from_slice(&y[start + lag..start + lag + keep]);
        }
        Ok((xx, yy))
    }

    /// Pairs `(x[t], y[t + lag])` within each segment, using every
    /// available point (`len - lag` pairs per segment).
    ///
    /// * `x` - regulator series over all observations
    /// * `y` - target series over all observations
    /// * `lag` - chosen lag
    pub fn lag_aligned(
        &self,
        x: &[f64],
        y: &[f64],
        lag: usize,
    ) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
        self.check_series(x, y)?;
        if let Some(&short) = self.lengths.iter().find(|&&l| l <= lag) {
            return Err(anyhow::anyhow!(
                "lag {} leaves nothing of a segment of length {}",
                lag,
                short
            ));
        }

        let ntot = self.total() - lag * self.num_segments();
        let mut xx = Vec::with_capacity(ntot);
        let mut yy = Vec::with_capacity(ntot);

        for (start, len) in self.bounds() {
            xx.extend_from_slice(&x[start..start + len - lag]);
            yy.extend_from_slice(&y[start + lag..start + len]);
        }
        Ok((xx, yy))
    }

    fn check_series(&self, x: &[f64], y: &[f64]) -> anyhow::Result<()> {
        if x.len() != y.len() {
            return Err(anyhow::anyhow!(
                "regulator has {} observations but target has {}",
                x.len(),
                y.len()
            ));
        }
        self.check_rows(x.len())
    }
}
