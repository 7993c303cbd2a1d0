use lentil::common::Mat;
use lentil::edges::{EdgeRecord, EdgeTable};
use lentil::evaluate::{read_reference_edges, EvaluationReport};
use lentil::expression::ExpressionMatrix;
use lentil::mrmr::{mrmr_filter, MrmrArgs};
use lentil::pairwise::{pairwise_mutual_information, PairwiseArgs};
use lentil::segments::Segments;
use lentil::simulate::{simulate_lagged_expression, SimArgs};
use lentil::smooth::{smooth_expression, SmoothArgs};

use matrix_util::common_io::{create_temp_dir_file, write_lines};
use matrix_util::traits::{IoOps, NamedIoOps};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn temp_file(suffix: &str) -> anyhow::Result<Box<str>> {
    let path = create_temp_dir_file(suffix)?;
    path.to_str()
        .map(Box::from)
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 temp path"))
}

/// A, C, D independent AR(1) series; B follows A one step later
fn lag_one_network(seed: u64) -> anyhow::Result<(ExpressionMatrix, Segments)> {
    let segments = Segments::new(vec![30, 30, 30])?;
    let mut rng = StdRng::seed_from_u64(seed);
    let innov = Normal::new(0.0, 0.5)?;
    let noise = Normal::new(0.0, 0.05)?;

    let mut mat = Mat::zeros(segments.total(), 4);
    for (start, len) in segments.bounds() {
        for g in [0, 2, 3] {
            let mut z: f64 = innov.sample(&mut rng);
            for t in 0..len {
                z = 0.8 * z + innov.sample(&mut rng);
                mat[(start + t, g)] = z;
            }
        }
        mat[(start, 1)] = innov.sample(&mut rng);
        for t in 1..len {
            mat[(start + t, 1)] = mat[(start + t - 1, 0)] + noise.sample(&mut rng);
        }
    }

    let genes: Vec<Box<str>> = ["A", "B", "C", "D"].iter().map(|&g| g.into()).collect();
    Ok((ExpressionMatrix::new(genes, vec![], mat)?, segments))
}

#[test]
fn lagged_copy_tops_the_ranking() -> anyhow::Result<()> {
    let (expr, segments) = lag_one_network(3)?;

    let raw = pairwise_mutual_information(&expr, &segments, &PairwiseArgs::default())?;
    assert_eq!(raw.len(), 12);

    let raw = raw.into_ranked();
    let top = &raw.records()[0];
    assert_eq!((top.regulator.as_ref(), top.target.as_ref()), ("A", "B"));

    let ranked = mrmr_filter(&raw, &MrmrArgs::default())?.into_ranked();
    let into_b = ranked
        .iter()
        .find(|e| e.target.as_ref() == "B")
        .ok_or_else(|| anyhow::anyhow!("no edge into B"))?;
    assert_eq!(into_b.regulator.as_ref(), "A");
    assert_eq!(into_b.score, top.score);
    Ok(())
}

#[test]
fn parallel_and_sequential_agree() -> anyhow::Result<()> {
    let (expr, segments) = lag_one_network(5)?;

    let seq = pairwise_mutual_information(&expr, &segments, &PairwiseArgs::default())?;
    let par = pairwise_mutual_information(
        &expr,
        &segments,
        &PairwiseArgs {
            n_jobs: 3,
            ..PairwiseArgs::default()
        },
    )?;
    assert_eq!(seq, par);
    Ok(())
}

#[test]
fn tf_set_restricts_regulators() -> anyhow::Result<()> {
    let (expr, segments) = lag_one_network(9)?;
    let args = PairwiseArgs {
        tf_set: vec!["A".into(), "unknown".into()],
        ..PairwiseArgs::default()
    };
    let raw = pairwise_mutual_information(&expr, &segments, &args)?;
    assert_eq!(raw.len(), 3);
    assert!(raw.iter().all(|e| e.regulator.as_ref() == "A"));
    Ok(())
}

#[test]
fn rows_must_match_segments() -> anyhow::Result<()> {
    let (expr, _) = lag_one_network(1)?;
    let segments = Segments::new(vec![30, 30])?;
    assert!(pairwise_mutual_information(&expr, &segments, &PairwiseArgs::default()).is_err());
    Ok(())
}

#[test]
fn simulated_edges_outscore_noise_genes() -> anyhow::Result<()> {
    let sim = simulate_lagged_expression(&SimArgs {
        rseed: 13,
        ..SimArgs::default()
    })?;

    let raw = pairwise_mutual_information(&sim.expression, &sim.segments, &PairwiseArgs::default())?;
    let lookup = raw.score_lookup();

    let weakest_true = sim
        .edges
        .iter()
        .map(|e| lookup[&e.regulator][&e.target])
        .fold(f64::INFINITY, f64::min);

    let strongest_noise = raw
        .iter()
        .filter(|e| e.regulator.starts_with('N') || e.target.starts_with('N'))
        .map(|e| e.score)
        .fold(f64::NEG_INFINITY, f64::max);

    assert!(
        weakest_true > strongest_noise,
        "true {} vs noise {}",
        weakest_true,
        strongest_noise
    );
    Ok(())
}

#[test]
fn smoothed_files_feed_inference() -> anyhow::Result<()> {
    let sim = simulate_lagged_expression(&SimArgs {
        rseed: 21,
        ..SimArgs::default()
    })?;

    let exp_file = temp_file(".csv.gz")?;
    let time_file = temp_file(".csv")?;
    sim.expression.to_named().to_named_csv(&exp_file)?;
    sim.pseudotime().to_named_csv(&time_file)?;

    let expression = Mat::from_named_csv(&exp_file)?;
    let pseudotime = Mat::from_named_csv(&time_file)?;
    let smoothed = smooth_expression(
        &pseudotime,
        &expression,
        &SmoothArgs {
            window_size: 1,
            slide: 1,
        },
    )?;

    assert_eq!(smoothed.segments, sim.segments);
    assert_eq!(smoothed.expression.genes(), sim.expression.genes());
    for (a, b) in smoothed
        .expression
        .mat()
        .iter()
        .zip(sim.expression.mat().iter())
    {
        approx::assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn edge_tables_survive_a_round_trip() -> anyhow::Result<()> {
    let table = EdgeTable::from(vec![
        EdgeRecord::new("A", "B", 1.25),
        EdgeRecord::new("C", "D", 0.5),
    ]);
    let file = temp_file(".csv")?;
    table.to_csv(&file)?;
    assert_eq!(EdgeTable::from_csv(&file)?, table);

    let segments = Segments::new(vec![4, 7])?;
    let seg_file = temp_file(".txt")?;
    segments.to_file(&seg_file)?;
    assert_eq!(Segments::from_file(&seg_file)?, segments);
    Ok(())
}

#[test]
fn evaluation_from_files() -> anyhow::Result<()> {
    let predicted = EdgeTable::from(vec![
        EdgeRecord::new("A", "B", 0.9),
        EdgeRecord::new("C", "D", 0.6),
        EdgeRecord::new("B", "C", 0.4),
        EdgeRecord::new("D", "A", 0.1),
    ]);
    let ref_file = temp_file(".csv")?;
    let lines: Vec<Box<str>> = vec!["Gene1,Gene2".into(), "A,B".into(), "B,C".into()];
    write_lines(&lines, &ref_file)?;

    let reference = read_reference_edges(&ref_file)?;
    assert_eq!(reference.len(), 2);

    let report = EvaluationReport::new(&predicted, &reference, Some(2), None)?;
    assert_eq!(report.early_precision.true_positives, 1);
    approx::assert_abs_diff_eq!(report.early_precision.ep, 0.5);
    // 2 edges over 3 genes
    approx::assert_abs_diff_eq!(report.sparsity, 2.0 / 6.0);
    approx::assert_abs_diff_eq!(report.auroc, 0.75);
    Ok(())
}
