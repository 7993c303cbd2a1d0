use matrix_util::common_io::{create_temp_dir_file, write_lines};
use matrix_util::traits::{IoOps, MatWithNames, NamedIoOps, SampleOps};
use nalgebra::DMatrix;

#[test]
fn dmatrix_io_test() -> anyhow::Result<()> {
    let xx = DMatrix::<f64>::runif(50, 20);

    let tsv_file = create_temp_dir_file("txt.gz")?;
    xx.to_tsv(tsv_file.to_str().unwrap())?;

    let yy = DMatrix::<f64>::read_file_delim(tsv_file.to_str().unwrap(), "\t", None)?;

    approx::assert_abs_diff_eq!(xx, yy);

    Ok(())
}

#[test]
fn named_table_round_trip() -> anyhow::Result<()> {
    let named = MatWithNames {
        rows: vec!["c1".into(), "c2".into(), "c3".into()],
        cols: vec!["g1".into(), "g2".into()],
        mat: DMatrix::<f64>::from_row_slice(3, 2, &[0.0, 1.5, 2.0, 0.0, 3.25, 4.0]),
    };

    let csv_file = create_temp_dir_file("csv")?;
    let csv_file = csv_file.to_str().unwrap();
    named.to_named_csv(csv_file)?;

    let back = DMatrix::<f64>::from_named_csv(csv_file)?;
    assert_eq!(back.rows, named.rows);
    assert_eq!(back.cols, named.cols);
    approx::assert_abs_diff_eq!(back.mat, named.mat);

    Ok(())
}

#[test]
fn named_table_with_missing_values() -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = vec![
        "\"cell\",\"branch1\",\"branch2\"".into(),
        "\"a\",0.1,".into(),
        "\"b\",NA,0.7".into(),
        "\"c\",0.3,0.2".into(),
    ];

    let csv_file = create_temp_dir_file("csv")?;
    let csv_file = csv_file.to_str().unwrap();
    write_lines(&lines, csv_file)?;

    let table = DMatrix::<f64>::from_named_csv(csv_file)?;
    let rows: Vec<Box<str>> = vec!["a".into(), "b".into(), "c".into()];
    let cols: Vec<Box<str>> = vec!["branch1".into(), "branch2".into()];
    assert_eq!(table.rows, rows);
    assert_eq!(table.cols, cols);
    assert!(table.mat[(0, 1)].is_nan());
    assert!(table.mat[(1, 0)].is_nan());
    assert_eq!(table.mat[(2, 1)], 0.2);

    Ok(())
}

#[test]
fn named_table_rejects_bad_numbers() -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = vec![",g1".into(), "a,zero".into()];

    let csv_file = create_temp_dir_file("csv")?;
    let csv_file = csv_file.to_str().unwrap();
    write_lines(&lines, csv_file)?;

    assert!(DMatrix::<f64>::from_named_csv(csv_file).is_err());
    Ok(())
}
