use fnv::FnvHashMap;
use matrix_util::common_io::{read_lines_of_words_delim, write_lines};

pub const EDGE_TABLE_HEADER: &str = "Gene1,Gene2,score";

/// A directed, scored edge `regulator -> target`
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub regulator: Box<str>,
    pub target: Box<str>,
    pub score: f64,
}

impl EdgeRecord {
    pub fn new(regulator: &str, target: &str, score: f64) -> Self {
        Self {
            regulator: regulator.into(),
            target: target.into(),
            score,
        }
    }
}

/// regulator -> target -> score
pub type ScoreLookup = FnvHashMap<Box<str>, FnvHashMap<Box<str>, f64>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeTable {
    records: Vec<EdgeRecord>,
}

impl From<Vec<EdgeRecord>> for EdgeTable {
    fn from(records: Vec<EdgeRecord>) -> Self {
        Self { records }
    }
}

impl EdgeTable {
    pub fn records(&self) -> &[EdgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeRecord> {
        self.records.iter()
    }

    /// Keep records with `score > 0`
    pub fn retain_positive(&mut self) {
        self.records.retain(|e| e.score > 0.0);
    }

    /// Sort by decreasing score; equal scores keep their order
    pub fn sort_by_score_desc(&mut self) {
        self.records.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    /// Positive records sorted by decreasing score, the form in which
    /// tables are handed between stages and written out
    pub fn into_ranked(mut self) -> Self {
        self.retain_positive();
        self.sort_by_score_desc();
        self
    }

    /// Score of each `regulator -> target` edge; the first record of a
    /// duplicated edge wins
    pub fn score_lookup(&self) -> ScoreLookup {
        let mut ret = ScoreLookup::default();
        for e in self.records.iter() {
            ret.entry(e.regulator.clone())
                .or_default()
                .entry(e.target.clone())
                .or_insert(e.score);
        }
        ret
    }

    /// Write `Gene1,Gene2,score` with a header line
    pub fn to_csv(&self, file: &str) -> anyhow::Result<()> {
        let mut lines: Vec<Box<str>> = Vec::with_capacity(self.records.len() + 1);
        lines.push(EDGE_TABLE_HEADER.into());
        for e in self.records.iter() {
            lines.push(format!("{},{},{}", e.regulator, e.target, e.score).into_boxed_str());
        }
        write_lines(&lines, file)
    }

    /// Read a table written by `to_csv` (the header line is skipped)
    pub fn from_csv(file: &str) -> anyhow::Result<Self> {
        let parsed = read_lines_of_words_delim(file, ',', 0)?;
        let records = parsed
            .lines
            .iter()
            .enumerate()
            .map(|(i, words)| {
                if words.len() < 3 {
                    return Err(anyhow::anyhow!(
                        "{}: line {} needs Gene1, Gene2 and score",
                        file,
                        i + 2
                    ));
                }
                let score = words[2].parse::<f64>().map_err(|e| {
                    anyhow::anyhow!("{}: line {}: bad score '{}': {}", file, i + 2, words[2], e)
                })?;
                Ok(EdgeRecord {
                    regulator: words[0].clone(),
                    target: words[1].clone(),
                    score,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_drops_non_positive_and_sorts() {
        let table = EdgeTable::from(vec![
            EdgeRecord::new("a", "b", 0.2),
            EdgeRecord::new("a", "c", 0.0),
            EdgeRecord::new("b", "c", 0.9),
            EdgeRecord::new("c", "a", -0.1),
            EdgeRecord::new("c", "b", 0.2),
        ])
        .into_ranked();

        let order: Vec<(&str, &str)> = table
            .iter()
            .map(|e| (e.regulator.as_ref(), e.target.as_ref()))
            .collect();
        assert_eq!(order, vec![("b", "c"), ("a", "b"), ("c", "b")]);
    }

    #[test]
    fn lookup_keeps_first_duplicate() {
        let table = EdgeTable::from(vec![
            EdgeRecord::new("a", "b", 0.5),
            EdgeRecord::new("a", "b", 0.1),
        ]);
        let lookup = table.score_lookup();
        assert_eq!(lookup["a"]["b"], 0.5);
        assert!(lookup.get("b").is_none());
    }
}
