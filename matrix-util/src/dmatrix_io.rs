use crate::common_io::{read_lines_of_types, read_lines_of_words_delim, write_lines, Delimiter};
use crate::traits::*;
pub use nalgebra::{DMatrix, DVector};
use num_traits::Float;

use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Missing-value markers accepted in named tables
const NA_WORDS: [&str; 5] = ["", "NA", "NaN", "nan", "NULL"];

fn parse_or_nan<T>(word: &str) -> anyhow::Result<T>
where
    T: Float + FromStr,
    <T as FromStr>::Err: Display,
{
    if NA_WORDS.contains(&word) {
        return Ok(T::nan());
    }
    word.parse::<T>()
        .map_err(|e| anyhow::anyhow!("failed to parse '{}': {}", word, e))
}

impl<T> IoOps for DMatrix<T>
where
    T: Float + nalgebra::Scalar + Send + Sync + FromStr + Display + Copy,
    <T as FromStr>::Err: Display + Debug,
{
    type Scalar = T;
    type Mat = Self;

    fn read_file_delim(
        tsv_file: &str,
        delim: impl Into<Delimiter>,
        skip: Option<usize>,
    ) -> anyhow::Result<Self::Mat> {
        let hdr_line = match skip {
            Some(skip) => skip as i64,
            None => -1, // no skipping
        };

        let data = read_lines_of_types::<T>(tsv_file, delim, hdr_line)?.lines;

        if data.is_empty() {
            return Err(anyhow::anyhow!("No data in file"));
        }

        let ncols = data[0].len();
        let nrows = data.len();

        if let Some(bad) = data.iter().position(|x| x.len() != ncols) {
            return Err(anyhow::anyhow!(
                "{}: row {} has {} fields, expected {}",
                tsv_file,
                bad + 1,
                data[bad].len(),
                ncols
            ));
        }

        let data = data.into_iter().flatten().collect::<Vec<_>>();
        Ok(DMatrix::<T>::from_row_iterator(nrows, ncols, data))
    }

    fn read_named_table(
        file: &str,
        delim: impl Into<Delimiter>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>> {
        let parsed = read_lines_of_words_delim(file, delim, 0)?;

        let nfields = parsed.lines.first().map(|x| x.len()).unwrap_or(0);
        if nfields < 2 {
            return Err(anyhow::anyhow!(
                "{}: expected a row-name column and at least one data column",
                file
            ));
        }

        // The header may or may not carry a name for the row-name column
        let cols: Vec<Box<str>> = if parsed.header.len() == nfields {
            parsed.header[1..].to_vec()
        } else if parsed.header.len() + 1 == nfields {
            parsed.header.clone()
        } else {
            return Err(anyhow::anyhow!(
                "{}: header has {} fields but rows have {}",
                file,
                parsed.header.len(),
                nfields
            ));
        };

        let ncols = cols.len();
        let nrows = parsed.lines.len();
        let mut rows = Vec::with_capacity(nrows);
        let mut data = Vec::with_capacity(nrows * ncols);

        for (i, words) in parsed.lines.iter().enumerate() {
            if words.len() != nfields {
                return Err(anyhow::anyhow!(
                    "{}: data row {} has {} fields, expected {}",
                    file,
                    i + 1,
                    words.len(),
                    nfields
                ));
            }
            rows.push(words[0].clone());
            for w in words[1..].iter() {
                data.push(parse_or_nan::<T>(w)?);
            }
        }

        Ok(MatWithNames {
            rows,
            cols,
            mat: DMatrix::<T>::from_row_iterator(nrows, ncols, data),
        })
    }

    fn write_file_delim(&self, tsv_file: &str, delim: &str) -> anyhow::Result<()> {
        // par_iter() or par_bridge() will
        // mess up the order of the rows
        let lines = self
            .row_iter()
            .map(|row| {
                row.iter()
                    .map(|x| format!("{}", *x))
                    .collect::<Vec<String>>()
                    .join(delim)
                    .into_boxed_str()
            })
            .collect::<Vec<_>>();

        write_lines(&lines, tsv_file)?;
        Ok(())
    }
}

impl<T> NamedIoOps for MatWithNames<DMatrix<T>>
where
    T: nalgebra::Scalar + Display + Copy,
{
    fn write_named_table(&self, file: &str, delim: &str, corner: &str) -> anyhow::Result<()> {
        if self.rows.len() != self.mat.nrows() || self.cols.len() != self.mat.ncols() {
            return Err(anyhow::anyhow!(
                "names ({} x {}) don't match the matrix ({} x {})",
                self.rows.len(),
                self.cols.len(),
                self.mat.nrows(),
                self.mat.ncols()
            ));
        }

        let mut lines = Vec::with_capacity(self.mat.nrows() + 1);

        let header = std::iter::once(corner.to_string())
            .chain(self.cols.iter().map(|c| c.to_string()))
            .collect::<Vec<_>>()
            .join(delim);
        lines.push(header.into_boxed_str());

        for (name, row) in self.rows.iter().zip(self.mat.row_iter()) {
            let line = std::iter::once(name.to_string())
                .chain(row.iter().map(|x| format!("{}", *x)))
                .collect::<Vec<_>>()
                .join(delim);
            lines.push(line.into_boxed_str());
        }

        write_lines(&lines, file)
    }
}
