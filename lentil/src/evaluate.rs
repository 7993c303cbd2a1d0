//! Scoring a ranked edge list against a reference network.

use crate::common::*;
use crate::edges::EdgeTable;
use matrix_util::common_io::read_lines_of_words_delim;
use serde::Serialize;

/// A predicted edge with its ground-truth label
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledEdge {
    pub regulator: Box<str>,
    pub target: Box<str>,
    pub score: f64,
    pub label: bool,
}

/// Directed `(regulator, target)` pairs of a reference network
pub type ReferenceEdges = Vec<(Box<str>, Box<str>)>;

/// Read a reference network: a header line, then one edge per line
/// with the regulator and target in the first two columns
pub fn read_reference_edges(file: &str) -> anyhow::Result<ReferenceEdges> {
    let parsed = read_lines_of_words_delim(file, ',', 0)?;
    parsed
        .lines
        .iter()
        .enumerate()
        .map(|(i, words)| {
            if words.len() < 2 {
                return Err(anyhow::anyhow!(
                    "{}: line {} needs a regulator and a target",
                    file,
                    i + 2
                ));
            }
            Ok((words[0].clone(), words[1].clone()))
        })
        .collect()
}

/// Label predicted edges by membership in the reference network.
///
/// Self-loops are removed and repeated rows (same edge, score and
/// label) are kept once, at their first position.
pub fn label_edges(predicted: &EdgeTable, reference: &[(Box<str>, Box<str>)]) -> Vec<LabeledEdge> {
    let truth: HashSet<(&str, &str)> = reference
        .iter()
        .map(|(r, t)| (r.as_ref(), t.as_ref()))
        .collect();

    let mut seen: HashSet<(&str, &str, u64)> = HashSet::new();
    let mut ret = vec![];

    for e in predicted.iter() {
        if e.regulator == e.target {
            continue;
        }
        if !seen.insert((e.regulator.as_ref(), e.target.as_ref(), e.score.to_bits())) {
            continue;
        }
        ret.push(LabeledEdge {
            regulator: e.regulator.clone(),
            target: e.target.clone(),
            score: e.score,
            label: truth.contains(&(e.regulator.as_ref(), e.target.as_ref())),
        });
    }
    ret
}

/// Indexes sorted by decreasing score; ties keep their order
fn rank_by_score(labeled: &[LabeledEdge]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labeled.len()).collect();
    order.sort_by(|&a, &b| labeled[b].score.total_cmp(&labeled[a].score));
    order
}

/// Cumulative `(true positives, false positives)` at each distinct
/// score threshold, from the highest score down
fn threshold_counts(labeled: &[LabeledEdge]) -> Vec<(usize, usize)> {
    let order = rank_by_score(labeled);
    let mut ret = vec![];
    let (mut tp, mut fp) = (0, 0);
    for (pos, &i) in order.iter().enumerate() {
        if labeled[i].label {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_tie = order
            .get(pos + 1)
            .is_none_or(|&next| labeled[next].score != labeled[i].score);
        if last_of_tie {
            ret.push((tp, fp));
        }
    }
    ret
}

fn class_sizes(labeled: &[LabeledEdge]) -> anyhow::Result<(usize, usize)> {
    let npos = labeled.iter().filter(|e| e.label).count();
    let nneg = labeled.len() - npos;
    if npos == 0 || nneg == 0 {
        return Err(anyhow::anyhow!(
            "need both true and false edges ({} positive, {} negative)",
            npos,
            nneg
        ));
    }
    Ok((npos, nneg))
}

fn trapezoid(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[1].1 + w[0].1) / 2.0)
        .sum()
}

/// Area under the ROC curve
pub fn auroc(labeled: &[LabeledEdge]) -> anyhow::Result<f64> {
    let (npos, nneg) = class_sizes(labeled)?;
    let mut points = vec![(0.0, 0.0)];
    points.extend(
        threshold_counts(labeled)
            .into_iter()
            .map(|(tp, fp)| (fp as f64 / nneg as f64, tp as f64 / npos as f64)),
    );
    Ok(trapezoid(&points))
}

/// Area under the precision-recall curve, anchored at recall 0 with
/// precision 1 and stopping at the first threshold with full recall
pub fn auprc(labeled: &[LabeledEdge]) -> anyhow::Result<f64> {
    let (npos, _) = class_sizes(labeled)?;
    let mut points = vec![(0.0, 1.0)];
    for (tp, fp) in threshold_counts(labeled) {
        let recall = tp as f64 / npos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        points.push((recall, precision));
        if tp == npos {
            break;
        }
    }
    Ok(trapezoid(&points))
}

#[derive(Clone, Debug, Serialize)]
pub struct EarlyPrecision {
    /// number of top edges looked at, `min(k, edges)`
    pub k: usize,
    pub true_positives: usize,
    /// fraction of true edges among the top `k`
    pub ep: f64,
    /// `ep` over the density of the reference network
    pub epr: f64,
}

/// Early precision of the top `k` edges and its ratio to `sparsity`
pub fn early_precision(
    labeled: &[LabeledEdge],
    k: usize,
    sparsity: f64,
) -> anyhow::Result<EarlyPrecision> {
    if labeled.is_empty() {
        return Err(anyhow::anyhow!("no edges to evaluate"));
    }
    if !(sparsity > 0.0) {
        return Err(anyhow::anyhow!("sparsity must be positive, got {}", sparsity));
    }
    let k = k.min(labeled.len());
    if k == 0 {
        return Err(anyhow::anyhow!("top-k must be at least 1"));
    }

    let true_positives = rank_by_score(labeled)
        .into_iter()
        .take(k)
        .filter(|&i| labeled[i].label)
        .count();

    let ep = true_positives as f64 / k as f64;
    Ok(EarlyPrecision {
        k,
        true_positives,
        ep,
        epr: ep / sparsity,
    })
}

/// Distinct reference edges over all ordered pairs of the genes they
/// involve, self pairs excluded
pub fn reference_density(reference: &[(Box<str>, Box<str>)]) -> anyhow::Result<f64> {
    let edges: HashSet<(&str, &str)> = reference
        .iter()
        .filter(|(r, t)| r != t)
        .map(|(r, t)| (r.as_ref(), t.as_ref()))
        .collect();
    let genes: HashSet<&str> = edges.iter().flat_map(|&(r, t)| [r, t]).collect();
    let ngenes = genes.len();
    if edges.is_empty() || ngenes < 2 {
        return Err(anyhow::anyhow!("reference network has no edges"));
    }
    Ok(edges.len() as f64 / (ngenes * (ngenes - 1)) as f64)
}

#[derive(Clone, Debug, Serialize)]
pub struct EvaluationReport {
    pub num_edges: usize,
    pub num_true_edges: usize,
    pub auroc: f64,
    pub auprc: f64,
    pub sparsity: f64,
    pub early_precision: EarlyPrecision,
}

impl EvaluationReport {
    /// Evaluate `predicted` against `reference`
    ///
    /// * `top_k` - edges for early precision (default: reference edges)
    /// * `sparsity` - density of the true network (default: the
    ///   reference density over its own genes)
    pub fn new(
        predicted: &EdgeTable,
        reference: &[(Box<str>, Box<str>)],
        top_k: Option<usize>,
        sparsity: Option<f64>,
    ) -> anyhow::Result<Self> {
        let labeled = label_edges(predicted, reference);
        let num_true_edges = labeled.iter().filter(|e| e.label).count();

        info!(
            "{} predicted edges, {} in the reference",
            labeled.len(),
            num_true_edges
        );

        let sparsity = match sparsity {
            Some(s) => s,
            None => reference_density(reference)?,
        };
        let top_k = match top_k {
            Some(k) => k,
            None => reference
                .iter()
                .filter(|(r, t)| r != t)
                .map(|(r, t)| (r.as_ref(), t.as_ref()))
                .collect::<HashSet<(&str, &str)>>()
                .len(),
        };

        Ok(Self {
            num_edges: labeled.len(),
            num_true_edges,
            auroc: auroc(&labeled)?,
            auprc: auprc(&labeled)?,
            sparsity,
            early_precision: early_precision(&labeled, top_k, sparsity)?,
        })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_file(&self, file: &str) -> anyhow::Result<()> {
        std::fs::write(file, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::EdgeRecord;
    use approx::assert_abs_diff_eq;

    fn labeled(pairs: &[(f64, bool)]) -> Vec<LabeledEdge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(score, label))| LabeledEdge {
                regulator: format!("r{}", i).into_boxed_str(),
                target: "t".into(),
                score,
                label,
            })
            .collect()
    }

    fn reference(pairs: &[(&str, &str)]) -> ReferenceEdges {
        pairs.iter().map(|&(r, t)| (r.into(), t.into())).collect()
    }

    #[test]
    fn perfect_ranking() -> anyhow::Result<()> {
        let edges = labeled(&[(0.9, true), (0.8, true), (0.3, false), (0.1, false)]);
        assert_abs_diff_eq!(auroc(&edges)?, 1.0);
        assert_abs_diff_eq!(auprc(&edges)?, 1.0);
        Ok(())
    }

    #[test]
    fn interleaved_ranking() -> anyhow::Result<()> {
        // ROC: (0,0) (0,.5) (.5,.5) (.5,1) (1,1) -> 0.75
        let edges = labeled(&[(0.9, true), (0.8, false), (0.7, true), (0.1, false)]);
        assert_abs_diff_eq!(auroc(&edges)?, 0.75);
        // PR: (0,1) (.5,1) (.5,.5) (1,2/3)
        let expected = 0.5 * 1.0 + 0.0 + 0.5 * (0.5 + 2.0 / 3.0) / 2.0;
        assert_abs_diff_eq!(auprc(&edges)?, expected, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn tied_scores_form_one_threshold() -> anyhow::Result<()> {
        let edges = labeled(&[(0.5, true), (0.5, false)]);
        assert_abs_diff_eq!(auroc(&edges)?, 0.5);
        Ok(())
    }

    #[test]
    fn single_class_is_an_error() {
        let edges = labeled(&[(0.9, true), (0.8, true)]);
        assert!(auroc(&edges).is_err());
        assert!(auprc(&edges).is_err());
    }

    #[test]
    fn early_precision_of_top_edges() -> anyhow::Result<()> {
        let edges = labeled(&[(0.9, true), (0.8, true), (0.3, false), (0.1, false)]);
        let ep = early_precision(&edges, 2, 0.25)?;
        assert_eq!(ep.k, 2);
        assert_eq!(ep.true_positives, 2);
        assert_abs_diff_eq!(ep.ep, 1.0);
        assert_abs_diff_eq!(ep.epr, 4.0);

        let ep = early_precision(&edges, 10, 0.5)?;
        assert_eq!(ep.k, 4);
        assert_abs_diff_eq!(ep.ep, 0.5);
        assert!(early_precision(&edges, 2, 0.0).is_err());
        assert!(early_precision(&[], 2, 0.5).is_err());
        Ok(())
    }

    #[test]
    fn labels_skip_self_loops_and_repeats() {
        let predicted = EdgeTable::from(vec![
            EdgeRecord::new("a", "b", 0.9),
            EdgeRecord::new("a", "a", 0.8),
            EdgeRecord::new("b", "c", 0.5),
            EdgeRecord::new("a", "b", 0.9),
        ]);
        let out = label_edges(&predicted, &reference(&[("a", "b"), ("a", "b")]));
        assert_eq!(out.len(), 2);
        assert!(out[0].label);
        assert!(!out[1].label);
    }

    #[test]
    fn density_over_reference_genes() -> anyhow::Result<()> {
        let refs = reference(&[("a", "b"), ("b", "c"), ("a", "b"), ("c", "c")]);
        assert_abs_diff_eq!(reference_density(&refs)?, 2.0 / 6.0);
        Ok(())
    }

    #[test]
    fn report_defaults_follow_the_reference() -> anyhow::Result<()> {
        let predicted = EdgeTable::from(vec![
            EdgeRecord::new("a", "b", 0.9),
            EdgeRecord::new("b", "c", 0.7),
            EdgeRecord::new("c", "a", 0.2),
        ]);
        let refs = reference(&[("a", "b"), ("b", "c")]);
        let report = EvaluationReport::new(&predicted, &refs, None, None)?;
        assert_eq!(report.early_precision.k, 2);
        assert_abs_diff_eq!(report.early_precision.ep, 1.0);
        assert_abs_diff_eq!(report.auroc, 1.0);
        assert!(report.to_json()?.contains("\"auprc\""));
        Ok(())
    }
}
