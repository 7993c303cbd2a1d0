use crate::common::*;
use crate::edges::{EdgeRecord, EdgeTable};
use crate::expression::ExpressionMatrix;
use crate::lag::lagged_mutual_information;
use crate::segments::Segments;

#[derive(Clone, Debug)]
pub struct PairwiseArgs {
    /// number of worker threads (0 = all logical CPUs)
    pub n_jobs: usize,
    /// number of neighbours of the MI estimator
    pub knn: usize,
    /// candidate regulators (empty = every gene)
    pub tf_set: Vec<Box<str>>,
}

impl Default for PairwiseArgs {
    fn default() -> Self {
        Self {
            n_jobs: 1,
            knn: DEFAULT_KNN,
            tf_set: vec![],
        }
    }
}

/// Ordered `(regulator, target)` column pairs, self pairs excluded.
///
/// With an empty `tf_set` every ordered pair of genes is returned (in
/// column order); otherwise the regulators are the TFs found among the
/// genes, in the order given, each paired with every other gene.
pub fn enumerate_gene_pairs(genes: &[Box<str>], tf_set: &[Box<str>]) -> Vec<(usize, usize)> {
    let ngenes = genes.len();

    let regulators: Vec<usize> = if tf_set.is_empty() {
        (0..ngenes).collect()
    } else {
        let gene_index: HashMap<&str, usize> = genes
            .iter()
            .enumerate()
            .map(|(j, g)| (g.as_ref(), j))
            .collect();

        let mut seen = HashSet::new();
        let mut ret = vec![];
        for tf in tf_set.iter() {
            match gene_index.get(tf.as_ref()) {
                Some(&j) => {
                    if seen.insert(j) {
                        ret.push(j);
                    }
                }
                None => warn!("TF {} is not among the genes; skipped", tf),
            }
        }
        ret
    };

    regulators
        .into_iter()
        .flat_map(|i| (0..ngenes).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect()
}

/// Lagged MI edge for one ordered gene pair
///
/// * `series` - expression series of every gene
/// * `genes` - gene names
/// * `segments` - trajectory segment lengths
/// * `pair` - `(regulator, target)` column indexes
/// * `knn` - number of neighbours of the MI estimator
pub fn score_gene_pair(
    series: &[Vec<f64>],
    genes: &[Box<str>],
    segments: &Segments,
    pair: (usize, usize),
    knn: usize,
) -> anyhow::Result<EdgeRecord> {
    let (i, j) = pair;
    let (mi, selection) = lagged_mutual_information(&series[i], &series[j], segments, knn)?;
    debug!("{} -> {}: lag {}, MI {:.4}", genes[i], genes[j], selection.lag, mi);
    Ok(EdgeRecord {
        regulator: genes[i].clone(),
        target: genes[j].clone(),
        score: mi,
    })
}

/// Lagged mutual information of every candidate gene pair.
///
/// Pairs are scored independently on a pool of `args.n_jobs` threads.
/// A pair that fails is logged and left out; the others still count.
/// Records come back in pair enumeration order, with zero scores kept.
///
/// * `expr` - observation x gene expression
/// * `segments` - trajectory segment lengths covering all observations
/// * `args` - pool size, k, TF set
pub fn pairwise_mutual_information(
    expr: &ExpressionMatrix,
    segments: &Segments,
    args: &PairwiseArgs,
) -> anyhow::Result<EdgeTable> {
    segments.check_rows(expr.num_obs())?;

    if expr.num_genes() < 2 {
        return Err(anyhow::anyhow!(
            "need at least two genes, got {}",
            expr.num_genes()
        ));
    }
    if args.knn == 0 {
        return Err(anyhow::anyhow!("k must be at least 1"));
    }

    info!(
        "expression: {} observations x {} genes in {} segments",
        expr.num_obs(),
        expr.num_genes(),
        segments.num_segments()
    );

    let genes = expr.genes();
    let pairs = enumerate_gene_pairs(genes, &args.tf_set);
    let npairs = pairs.len();
    info!("{} gene pairs to score (max lag {})", npairs, segments.max_lag());

    let series: Vec<Vec<f64>> = (0..expr.num_genes())
        .map(|j| expr.gene_series(j))
        .collect();

    let pool = create_thread_pool(args.n_jobs)?;

    let records: Vec<EdgeRecord> = pool.install(|| {
        pairs
            .par_iter()
            .progress_count(npairs as u64)
            .filter_map(
                |&(i, j)| match score_gene_pair(&series, genes, segments, (i, j), args.knn) {
                    Ok(edge) => Some(edge),
                    Err(e) => {
                        warn!("pair {} -> {} failed: {}", genes[i], genes[j], e);
                        None
                    }
                },
            )
            .collect()
    });

    info!("scored {} / {} gene pairs", records.len(), npairs);
    Ok(EdgeTable::from(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<Box<str>> {
        v.iter().map(|&s| s.into()).collect()
    }

    #[test]
    fn all_ordered_pairs_without_tfs() {
        let genes = names(&["a", "b", "c"]);
        let pairs = enumerate_gene_pairs(&genes, &[]);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]);
    }

    #[test]
    fn tf_pairs_skip_self_and_unknown() {
        let genes = names(&["a", "b", "c"]);
        let tfs = names(&["c", "zz", "a", "c"]);
        let pairs = enumerate_gene_pairs(&genes, &tfs);
        assert_eq!(pairs, vec![(2, 0), (2, 1), (0, 1), (0, 2)]);
    }

    #[test]
    fn failing_pairs_are_dropped() -> anyhow::Result<()> {
        // 4 aligned points can't support k = 5, so every pair fails
        let mat = Mat::from_row_slice(4, 2, &[1., 4., 2., 3., 3., 2., 4., 1.]);
        let expr = ExpressionMatrix::new(names(&["a", "b"]), vec![], mat)?;
        let segments = Segments::new(vec![2, 2])?;

        let out = pairwise_mutual_information(&expr, &segments, &PairwiseArgs::default())?;
        assert!(out.is_empty());
        Ok(())
    }
}
