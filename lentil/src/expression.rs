use crate::common::*;
use matrix_util::traits::MatWithNames;

/// Smoothed expression: rows are pseudo-time ordered observations
/// (concatenated over trajectory segments), columns are genes
#[derive(Clone, Debug)]
pub struct ExpressionMatrix {
    genes: Vec<Box<str>>,
    obs: Vec<Box<str>>,
    mat: Mat,
}

impl ExpressionMatrix {
    /// * `genes` - column names
    /// * `obs` - row names (may be empty to use numbered rows)
    /// * `mat` - observation x gene values (finite)
    pub fn new(genes: Vec<Box<str>>, obs: Vec<Box<str>>, mat: Mat) -> anyhow::Result<Self> {
        if genes.len() != mat.ncols() {
            return Err(anyhow::anyhow!(
                "{} gene names for {} columns",
                genes.len(),
                mat.ncols()
            ));
        }

        let obs = if obs.is_empty() {
            (1..=mat.nrows())
                .map(|i| i.to_string().into_boxed_str())
                .collect()
        } else {
            obs
        };

        if obs.len() != mat.nrows() {
            return Err(anyhow::anyhow!(
                "{} observation names for {} rows",
                obs.len(),
                mat.nrows()
            ));
        }

        if let Some(j) = mat
            .column_iter()
            .position(|col| col.iter().any(|x| !x.is_finite()))
        {
            return Err(anyhow::anyhow!(
                "gene {} has missing or non-finite values",
                genes[j]
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        if let Some(dup) = genes.iter().find(|&g| !seen.insert(g.as_ref())) {
            return Err(anyhow::anyhow!("duplicate gene name {}", dup));
        }

        Ok(Self { genes, obs, mat })
    }

    pub fn from_named(named: MatWithNames<Mat>) -> anyhow::Result<Self> {
        Self::new(named.cols, named.rows, named.mat)
    }

    pub fn to_named(&self) -> MatWithNames<Mat> {
        MatWithNames {
            rows: self.obs.clone(),
            cols: self.genes.clone(),
            mat: self.mat.clone(),
        }
    }

    pub fn num_obs(&self) -> usize {
        self.mat.nrows()
    }

    pub fn num_genes(&self) -> usize {
        self.mat.ncols()
    }

    pub fn genes(&self) -> &[Box<str>] {
        &self.genes
    }

    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    /// Expression series of gene `j` across all observations
    pub fn gene_series(&self, j: usize) -> Vec<f64> {
        self.mat.column(j).iter().copied().collect()
    }
}
