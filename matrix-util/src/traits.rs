use crate::common_io::Delimiter;

/// A matrix together with its row and column names
#[derive(Clone, Debug)]
pub struct MatWithNames<M> {
    pub rows: Vec<Box<str>>,
    pub cols: Vec<Box<str>>,
    pub mat: M,
}

/// Read and write plain delimited matrices
pub trait IoOps {
    type Scalar;
    type Mat;

    /// Read a numeric matrix without row or column names
    fn read_file_delim(
        file: &str,
        delim: impl Into<Delimiter>,
        skip: Option<usize>,
    ) -> anyhow::Result<Self::Mat>;

    fn from_tsv(tsv_file: &str, skip: Option<usize>) -> anyhow::Result<Self::Mat> {
        Self::read_file_delim(tsv_file, "\t", skip)
    }

    /// Read a table whose first line holds column names and whose
    /// first field on every other line holds a row name. Empty and
    /// `NA`-like fields become `NaN`.
    fn read_named_table(
        file: &str,
        delim: impl Into<Delimiter>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>>;

    fn from_named_csv(csv_file: &str) -> anyhow::Result<MatWithNames<Self::Mat>> {
        Self::read_named_table(csv_file, ',')
    }

    fn write_file_delim(&self, file: &str, delim: &str) -> anyhow::Result<()>;

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(tsv_file, "\t")
    }

    fn to_csv(&self, csv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(csv_file, ",")
    }
}

/// Write a matrix along with its names
pub trait NamedIoOps {
    /// * `file` - output file (gzipped if it ends with `.gz`)
    /// * `delim` - field delimiter
    /// * `corner` - the name of the row-name column in the header
    fn write_named_table(&self, file: &str, delim: &str, corner: &str) -> anyhow::Result<()>;

    fn to_named_csv(&self, csv_file: &str) -> anyhow::Result<()> {
        self.write_named_table(csv_file, ",", "")
    }
}

/// Operations to sample random matrices
pub trait SampleOps {
    type Mat;
    type Scalar;

    /// Sample a matrix from a uniform distribution `U(0,1)`
    fn runif(dd: usize, nn: usize) -> Self::Mat;

    /// Sample a matrix from a normal distribution `N(0,1)`
    fn rnorm(dd: usize, nn: usize) -> Self::Mat;

    /// Same as `runif` but reproducible with `seed`
    fn runif_seeded(dd: usize, nn: usize, seed: u64) -> Self::Mat;

    /// Same as `rnorm` but reproducible with `seed`
    fn rnorm_seeded(dd: usize, nn: usize, seed: u64) -> Self::Mat;
}
