//! Max-relevance min-redundancy re-ranking of candidate regulators.
//!
//! For one target, regulators are taken greedily. The strongest raw MI
//! edge is kept as is. Every later pick maximizes
//!
//! ```text
//! score(c) = MI(c -> target) - red(c) / |selected|
//! ```
//!
//! where `red(c)` accumulates, over the selected regulators, the raw MI
//! between `c` and each of them, read off the full edge table.

use crate::common::*;
use crate::edges::{EdgeRecord, EdgeTable, ScoreLookup};
use matrix_util::utils::partition_by_membership;

/// Which raw MI edge measures redundancy between a candidate `c` and
/// an already selected regulator `s`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Redundancy {
    /// edge `s -> c`
    #[default]
    Outgoing,
    /// edge `c -> s`
    Incoming,
}

impl Redundancy {
    /// Raw MI between `candidate` and `selected`; 0 if the table has no
    /// such edge
    pub fn lookup(&self, scores: &ScoreLookup, candidate: &str, selected: &str) -> f64 {
        let (from, to) = match self {
            Redundancy::Outgoing => (selected, candidate),
            Redundancy::Incoming => (candidate, selected),
        };
        scores
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Debug)]
pub struct MrmrArgs {
    /// number of worker threads (0 = all logical CPUs)
    pub n_jobs: usize,
    pub redundancy: Redundancy,
}

impl Default for MrmrArgs {
    fn default() -> Self {
        Self {
            n_jobs: 1,
            redundancy: Redundancy::default(),
        }
    }
}

/// Re-rank the incoming edges of a single target
///
/// * `candidates` - raw MI edges that share one target
/// * `scores` - raw MI of the full edge table
/// * `redundancy` - direction of the redundancy lookup
///
/// Returns the edges in selection order with revised scores. The first
/// edge is the top raw MI edge, unchanged; a lone candidate comes back
/// as it is. Ties go to the candidate ranked higher by raw MI.
pub fn mrmr_for_target(
    candidates: &[EdgeRecord],
    scores: &ScoreLookup,
    redundancy: Redundancy,
) -> anyhow::Result<Vec<EdgeRecord>> {
    let Some(first) = candidates.first() else {
        return Ok(vec![]);
    };

    if let Some(other) = candidates.iter().find(|e| e.target != first.target) {
        return Err(anyhow::anyhow!(
            "candidates mix targets {} and {}",
            first.target,
            other.target
        ));
    }
    if let Some(bad) = candidates.iter().find(|e| !e.score.is_finite()) {
        return Err(anyhow::anyhow!(
            "edge {} -> {} has a non-finite score",
            bad.regulator,
            bad.target
        ));
    }

    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    if ranked.len() == 1 {
        return Ok(ranked);
    }

    let mut pool = ranked.split_off(1);
    let mut ret = ranked;
    let mut selected: Vec<Box<str>> = vec![ret[0].regulator.clone()];
    let mut red = vec![0.0; pool.len()];

    while !pool.is_empty() {
        let Some(last) = selected.last() else {
            break;
        };

        for (c, r) in pool.iter().zip(red.iter_mut()) {
            *r += redundancy.lookup(scores, &c.regulator, last);
        }

        let nsel = selected.len() as f64;
        let revised: Vec<f64> = pool
            .iter()
            .zip(red.iter())
            .map(|(c, r)| c.score - r / nsel)
            .collect();

        let best = crate::lag::argmax_first(&revised)
            .ok_or_else(|| anyhow::anyhow!("no valid revised score for {}", first.target))?;

        let picked = pool.remove(best);
        red.remove(best);

        selected.push(picked.regulator.clone());
        ret.push(EdgeRecord {
            score: revised[best],
            ..picked
        });
    }

    Ok(ret)
}

/// mRMR re-ranking of every target in the table.
///
/// Targets are handled independently on a pool of `args.n_jobs`
/// threads and their outputs concatenated in order of first
/// appearance. A target that fails is logged and left out.
///
/// * `table` - raw MI edges (usually positive and sorted)
/// * `args` - pool size and redundancy direction
pub fn mrmr_filter(table: &EdgeTable, args: &MrmrArgs) -> anyhow::Result<EdgeTable> {
    let scores = table.score_lookup();

    let targets: Vec<Box<str>> = table.iter().map(|e| e.target.clone()).collect();
    let (target_order, members) = partition_by_membership(&targets);
    let ntargets = target_order.len();

    info!(
        "mRMR over {} edges, {} targets ({:?} redundancy)",
        table.len(),
        ntargets,
        args.redundancy
    );

    let records = table.records();
    let pool = create_thread_pool(args.n_jobs)?;

    let revised: Vec<Vec<EdgeRecord>> = pool.install(|| {
        target_order
            .par_iter()
            .progress_count(ntargets as u64)
            .filter_map(|target| {
                let candidates: Vec<EdgeRecord> = members[target]
                    .iter()
                    .map(|&i| records[i].clone())
                    .collect();
                match mrmr_for_target(&candidates, &scores, args.redundancy) {
                    Ok(ret) => Some(ret),
                    Err(e) => {
                        warn!("mRMR for target {} failed: {}", target, e);
                        None
                    }
                }
            })
            .collect()
    });

    info!("revised {} / {} targets", revised.len(), ntargets);
    Ok(EdgeTable::from(revised.into_iter().flatten().collect::<Vec<_>>()))
}
