use matrix_util::kdtree::{chebyshev, ChebyshevKdTree};
use matrix_util::traits::SampleOps;
use nalgebra::DMatrix;

fn brute_force_sorted(data: &DMatrix<f64>, query: &[f64]) -> Vec<f64> {
    let mut dist = data
        .row_iter()
        .map(|row| {
            let p: Vec<f64> = row.iter().copied().collect();
            chebyshev(&p, query)
        })
        .collect::<Vec<_>>();
    dist.sort_by(|a, b| a.total_cmp(b));
    dist
}

#[test]
fn knn_matches_brute_force() -> anyhow::Result<()> {
    let data = DMatrix::<f64>::rnorm_seeded(300, 3, 7);
    let tree = ChebyshevKdTree::from_rows(&data)?;

    for i in (0..data.nrows()).step_by(17) {
        let query: Vec<f64> = data.row(i).iter().copied().collect();
        let expected = brute_force_sorted(&data, &query);

        for k in [1, 2, 6, 40] {
            let kth = tree.kth_distance(&query, k)?;
            approx::assert_abs_diff_eq!(kth, expected[k - 1]);
        }

        let found = tree.knn(&query, 10);
        assert_eq!(found.len(), 10);
        assert_eq!(found[0].1, 0.0);
    }
    Ok(())
}

#[test]
fn radius_count_matches_brute_force() -> anyhow::Result<()> {
    let data = DMatrix::<f64>::runif_seeded(250, 2, 11);
    let tree = ChebyshevKdTree::from_rows(&data)?;

    for i in (0..data.nrows()).step_by(13) {
        let query: Vec<f64> = data.row(i).iter().copied().collect();
        let expected = brute_force_sorted(&data, &query);
        for r in [0.0, 0.05, 0.2, 0.75] {
            let n_expected = expected.iter().filter(|&&d| d <= r).count();
            assert_eq!(tree.count_within(&query, r), n_expected);
        }
    }
    Ok(())
}

#[test]
fn duplicated_points_are_all_counted() -> anyhow::Result<()> {
    // zero-inflated column: many exact ties at zero
    let mut values = vec![0.0; 60];
    values.extend((1..=40).map(|i| i as f64 / 10.0));
    let tree = ChebyshevKdTree::from_scalars(&values)?;

    assert_eq!(tree.count_within(&[0.0], 1e-15), 60);
    assert_eq!(tree.kth_distance(&[0.0], 60)?, 0.0);
    approx::assert_abs_diff_eq!(tree.kth_distance(&[0.0], 61)?, 0.1);
    assert!(tree.kth_distance(&[0.0], 101).is_err());
    Ok(())
}
